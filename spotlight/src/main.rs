use spotlight::{command_argument_builder, handle_crawl};

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    let exit_code = handle_crawl(&matches).await;
    std::process::exit(exit_code);
}
