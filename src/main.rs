#[tokio::main]
async fn main() {
    serenite::run().await;
}
