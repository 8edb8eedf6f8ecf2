use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use apigee_m10n::{
    config::{CacheBackendKind, Config},
    database::{create_pool, run_migrations},
    external::{ApigeeClient, MonetizationApi},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::{Clock, JwtService, SystemClock},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 选择缓存后端；数据库后端需要连接池与迁移
    let cache_backend: Arc<dyn CacheBackend> = match config.cache.backend {
        CacheBackendKind::Database => {
            let pool = create_pool(&config.database)
                .await
                .expect("Failed to create database connection pool");
            run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            Arc::new(DatabaseCacheBackend::new(pool))
        }
        CacheBackendKind::Memory => Arc::new(MemoryCacheBackend::new()),
    };
    log::info!("Using {:?} cache backend", config.cache.backend);

    // 创建JWT服务
    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expires_in);

    // 创建外部服务
    let apigee: Arc<dyn MonetizationApi> = Arc::new(ApigeeClient::new(config.apigee.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 创建服务
    let services = Services::new(&config, apigee, cache_backend, clock);

    // 启动后台任务
    tasks::spawn_all(services.cache.clone(), config.cache.gc_interval);

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{} for organization {}",
        config.server.host,
        config.server.port,
        config.apigee.organization
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .app_data(web::Data::new(services.cache.clone()))
            .app_data(web::Data::new(services.organization.clone()))
            .app_data(web::Data::new(services.catalog.clone()))
            .app_data(web::Data::new(services.purchases.clone()))
            .app_data(web::Data::new(services.billing.clone()))
            .app_data(web::Data::new(services.terms.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::monetization_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
