use actix_web::web;
use employee_api::config::AppConfig;
use employee_api::state::AppState;
use shuttle_actix_web::ShuttleActixWeb;
use shuttle_runtime::SecretStore;
use shuttle_runtime::__internals::Context;
use tracing::info;

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> ShuttleActixWeb<impl FnOnce(&mut web::ServiceConfig) + Send + Clone + 'static> {
    let config = AppConfig::from_secrets(&secrets).context("invalid configuration")?;
    let state = AppState::from_config(&config)
        .context("building the credential store should succeed")?;
    info!(
        "Employee API ready, tokens valid for {}",
        state.tokens().expires_in()
    );

    let state = web::Data::new(state);

    let config = move |cfg: &mut web::ServiceConfig| {
        employee_api::configure(cfg, state.clone());
    };

    Ok(config.into())
}
