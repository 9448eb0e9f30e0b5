use rocket::{
    Config,
    config::Ident,
    figment::{Figment, providers::Serialized},
    routes,
};

use crate::{
    config::HttpServerConfig,
    errors::{HttpServerError, HttpServerResult},
    routes,
};

#[derive(Clone)]
pub struct HttpServerContext {
    pub config: HttpServerConfig,
}

pub struct HttpServer {
    context: HttpServerContext,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig) -> Self {
        Self {
            context: HttpServerContext { config },
        }
    }

    pub async fn run(&mut self) -> HttpServerResult<()> {
        tracing::info!("http server is running, config: {:?}", self.context.config);
        let figment = Figment::from(Config {
            log_level: rocket::config::LogLevel::Off,
            ident: Ident::try_new("rill").unwrap(),
            keep_alive: 5,
            ..Default::default()
        })
        .merge(Serialized::defaults(&self.context.config));

        rocket::custom(figment)
            .manage(self.context.clone())
            .mount("/", routes![routes::hls::serve])
            .launch()
            .await
            .map_err(|err| HttpServerError::Launch(format!("{}", err)))?;
        Ok(())
    }
}
