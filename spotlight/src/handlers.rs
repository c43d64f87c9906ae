use clap::ArgMatches;
use colored::Colorize;
use spotlight_core::{
    CrawlError, CrawlEvent, CrawlOptions, CrawlOutcome, EventCallback, Mode, execute_crawl,
    expand_output_dir, generate_crawl_report, generate_json_report, summary_line,
};
use spotlight_scanner::traversal::DEFAULT_USER_AGENT;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug, info};

/// Install the stderr log subscriber. Stdout is reserved for URLs and reports.
pub fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build crawl options from parsed arguments.
pub fn options_from_matches(matches: &ArgMatches) -> CrawlOptions {
    let mode = Mode::from_flags(
        matches.get_flag("no-download"),
        matches.get_flag("update"),
        matches.get_flag("full-update"),
    );

    let output_dir = matches
        .get_one::<String>("output-directory")
        .map(|dir| expand_output_dir(dir))
        .unwrap_or_else(|| expand_output_dir("."));

    let timeout = match matches.get_one::<u64>("timeout").copied().unwrap_or(30) {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    CrawlOptions {
        website: matches
            .get_one::<String>("website")
            .cloned()
            .unwrap_or_else(|| CrawlOptions::default().website),
        start_page: matches.get_one::<u32>("page-number").copied().unwrap_or(1),
        output_dir,
        mode,
        user_agent: matches
            .get_one::<String>("user-agent")
            .cloned()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        timeout,
        show_progress: !matches.get_flag("quiet") && !matches.get_flag("json"),
    }
}

/// `[ERROR_NN] message`, the code naming the failure kind.
pub fn format_error(err: &anyhow::Error) -> String {
    if let Some(crawl_error) = err.downcast_ref::<CrawlError>() {
        format!("[{}] {}", crawl_error.code(), crawl_error)
    } else if err.downcast_ref::<std::io::Error>().is_some() {
        format!("[ERROR_04] {:#}", err)
    } else {
        format!("[ERROR] {:#}", err)
    }
}

/// Prints listed URLs to stdout and logs everything else.
pub fn event_printer() -> EventCallback {
    Arc::new(|event: CrawlEvent| match event {
        CrawlEvent::Listed { url } => println!("{}", url),
        CrawlEvent::Downloaded { path, bytes } => info!("Saved {} ({} bytes)", path.display(), bytes),
        CrawlEvent::Skipped { path } => debug!("Kept existing {}", path.display()),
        CrawlEvent::CaughtUp { path } => info!("Found existing {}", path.display()),
        CrawlEvent::Grabbing { .. } | CrawlEvent::Unrecognised { .. } => {}
    })
}

/// Text printed once the crawl ends without error.
pub fn render_outcome(
    outcome: &CrawlOutcome,
    options: &CrawlOptions,
    json: bool,
    quiet: bool,
) -> anyhow::Result<String> {
    if json {
        return Ok(generate_json_report(outcome)?);
    }
    if quiet {
        let mut line = summary_line(outcome.summary());
        if outcome.is_caught_up() {
            line.push_str(", update finished");
        }
        return Ok(line);
    }
    Ok(generate_crawl_report(outcome, options))
}

/// Run the crawl described by `matches` and return the process exit code.
pub async fn handle_crawl(matches: &ArgMatches) -> i32 {
    let json = matches.get_flag("json");
    let quiet = matches.get_flag("quiet");
    init_logging(matches.get_flag("verbose"), quiet);

    let options = options_from_matches(matches);
    debug!("Crawl options: {:?}", options);

    let result = execute_crawl(options.clone(), Some(event_printer()))
        .await
        .and_then(|outcome| {
            // List-only output is the URLs themselves.
            if options.mode != Mode::ListOnly || json {
                println!("{}", render_outcome(&outcome, &options, json, quiet)?);
            }
            Ok(())
        });

    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", format_error(&e).red().bold());
            1
        }
    }
}
