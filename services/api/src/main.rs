use visa_scout_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("visa scout error: {err}");
        std::process::exit(1);
    }
}
