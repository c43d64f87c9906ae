use clap::arg;
use spotlight_scanner::traversal::DEFAULT_WEBSITE;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("spotlight")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("spotlight")
        .about("Download 1920x1080 images from the Windows 10 Spotlight gallery")
        .after_help("GitHub Page: https://github.com/locobastos/windows-10-spotlight-downloader")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-f --"full-update")
                .required(false)
                .help("Update the library. Browse all images but do not re-download them"),
        )
        .arg(
            arg!(-n --"no-download")
                .required(false)
                .help("List image URLs only, nothing is written to disk"),
        )
        .arg(
            arg!(-o --"output-directory" <PATH>)
                .required(false)
                .help("The folder to save images into, created if missing")
                .default_value("."),
        )
        .arg(
            arg!(-p --"page-number" <NUM>)
                .required(false)
                .help("The page number to start downloading from")
                .value_parser(clap::value_parser!(u32))
                .default_value("1"),
        )
        .arg(
            arg!(-u --"update")
                .required(false)
                .help("Update the library. Stop at the first image already downloaded (default)"),
        )
        .arg(
            arg!(-w --"website" <URL>)
                .required(false)
                .help("Base URL of the gallery to crawl")
                .default_value(DEFAULT_WEBSITE),
        )
        .arg(
            arg!(--"user-agent" <USER_AGENT>)
                .required(false)
                .help("User-Agent header sent with every request (default: desktop Chrome)"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds, 0 disables it")
                .value_parser(clap::value_parser!(u64))
                .default_value("30"),
        )
        .arg(
            arg!(--"json")
                .required(false)
                .help("Print the end of run summary as JSON"),
        )
        .arg(
            arg!(-v --"verbose")
                .required(false)
                .help("Log every page and decision")
                .conflicts_with("quiet"),
        )
        .arg(
            arg!(-q --"quiet")
                .required(false)
                .help("Only log warnings and print a one line summary"),
        )
}
