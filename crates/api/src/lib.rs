mod error;
mod job_schedulers;
mod reminder;
mod shared;
mod status;
#[cfg(test)]
mod test_utils;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use docket_infra::DocketContext;
pub use job_schedulers::{run_send_reminders_loop, start_send_reminders_job};
use std::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    reminder::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    shutdown: CancellationToken,
    reminders_job: JoinHandle<()>,
}

impl Application {
    pub async fn new(context: DocketContext) -> Result<Self, std::io::Error> {
        let shutdown = CancellationToken::new();
        let (server, port) =
            Application::configure_server(context.clone(), shutdown.clone()).await?;
        let reminders_job = start_send_reminders_job(context, shutdown.clone());

        Ok(Self {
            server,
            port,
            shutdown,
            reminders_job,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Cancelling this token stops the reminder poller and any manual dispatch
    /// cycle between tasks
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    async fn configure_server(
        context: DocketContext,
        shutdown: CancellationToken,
    ) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();
            let shutdown = shutdown.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .app_data(web::Data::new(shutdown))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Runs the http server until it stops (actix handles Ctrl-C) and then
    /// waits for the reminder poller to wind down. Ctrl-C also cancels the
    /// shutdown token right away so in-flight dispatch cycles stop between tasks.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let shutdown = self.shutdown.clone();
        actix_web::rt::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received, stopping task reminder dispatch");
                shutdown.cancel();
            }
        });

        let res = self.server.await;
        info!("Http server stopped, shutting down the task reminder poller");
        self.shutdown.cancel();
        if let Err(e) = self.reminders_job.await {
            tracing::error!("Task reminder poller did not shut down cleanly: {:?}", e);
        }
        res
    }
}
