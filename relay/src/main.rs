#[tokio::main]
async fn main() {
    relay::start_server().await;
}
