mod batch;
mod cli;
mod infra;
mod regression;
mod routes;
mod server;

use record_analytic::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
