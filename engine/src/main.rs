#![deny(warnings)]
#![deny(rust_2018_idioms)]

use engine::{settings::Settings, startup::App};
use tracing::error;

#[tokio::main]
async fn main() {
    let settings = Settings::new().unwrap();
    settings.init_tracer();

    let app = App::build(&settings).unwrap();

    if let Err(e) = app.run().await {
        error!("anchorage run failed: {e:?}");
        std::process::exit(1);
    }
}
