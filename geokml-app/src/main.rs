use std::path::PathBuf;

use geokml_config::{AppConfig, ConfigError};
use geokml_io::{DocumentLoader, KmlContext, KmlFacade, KmlObject, OverlayFeature, WriteOptions};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let mut args = std::env::args().skip(1);
    let mut strict_override: Option<bool> = None;
    let mut config_override: Option<PathBuf> = None;
    let mut input: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--strict" => strict_override = Some(true),
            "--lenient" => strict_override = Some(false),
            "--config" => {
                let Some(path) = args.next() else {
                    eprintln!("`--config` 需要提供配置文件路径");
                    std::process::exit(1);
                };
                config_override = Some(PathBuf::from(path));
            }
            other if other.starts_with("--") => {
                eprintln!("未知参数：{other}");
                std::process::exit(1);
            }
            other => input = Some(PathBuf::from(other)),
        }
    }

    let Some(input) = input else {
        eprintln!("用法：geokml-app [--config PATH] [--strict|--lenient] FILE");
        std::process::exit(1);
    };

    let config = load_configuration(config_override);
    init_logging(&config);
    info!("启动 GeoKML 应用");

    let facade = build_facade(&config, strict_override);
    let document = match facade.load(&input) {
        Ok(document) => document,
        Err(err) => {
            error!(path = %input.display(), error = %err, "无法读取 KML 文档");
            std::process::exit(1);
        }
    };

    for feature in &document.features {
        match feature {
            OverlayFeature::Ground(overlay) => info!(
                name = feature.name().unwrap_or_default(),
                altitude_mode = %overlay.effective_altitude_mode(),
                has_bounds = overlay.lat_lon_box.as_ref().is_some_and(|bounds| bounds.is_present()),
                "GroundOverlay"
            ),
            OverlayFeature::Photo(overlay) => info!(
                name = feature.name().unwrap_or_default(),
                shape = ?overlay.shape,
                has_point = overlay.point.is_some(),
                "PhotoOverlay"
            ),
        }
    }

    match facade.render(&document) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            error!(error = %err, "无法输出 KML 文档");
            std::process::exit(1);
        }
    }
}

fn build_facade(config: &AppConfig, strict_override: Option<bool>) -> KmlFacade {
    let context = match &config.parsing.namespace {
        Some(uri) if uri.is_empty() => KmlContext::new(""),
        Some(uri) => KmlContext::new(format!("{{{uri}}}")),
        None => KmlContext::default(),
    };
    let mut options = WriteOptions::default().with_verbosity(config.output.verbosity);
    if let Some(precision) = config.output.precision {
        options = options.with_precision(precision);
    }
    if config.output.pretty {
        options = options.pretty();
    }
    KmlFacade::new()
        .with_context(context)
        .strict(strict_override.unwrap_or(config.parsing.strict))
        .with_options(options)
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
