use kvlinks::config::Config;
use kvlinks::handler::{self, Ctx};
use lambda_http::{run, service_fn, Error, Request};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let config = Config::from_env()?;
    tracing::info!(?config, "starting");
    let ctx = Ctx::from_config(config).await?;

    run(service_fn(move |req: Request| {
        let ctx = ctx.clone();
        async move { handler::router(req, &ctx).await }
    }))
    .await
}
