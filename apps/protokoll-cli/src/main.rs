//! 协议抓取客户端：抓取、缓存、解码并汇总展示维护协议。
//!
//! 命令：
//! - `fetch <vn>`  抓取并缓存一份协议，解码后打印摘要
//! - `show <vn>`   从缓存解码并打印摘要（离线）
//! - `recent`      打印最近缓存的协议摘要
//! - `list` / `delete <vn>` / `clear`  缓存维护

use construct::{ProtokollConstruct, to_construct};
use envelope::decode;
use protokoll_config::{AppConfig, KeySource, TransportSetting, cache_dir_from_env};
use protokoll_crypto::resolve_key;
use protokoll_storage::{ProtokollStore, safe_name};
use protokoll_telemetry::{
    init_tracing, new_request_ids, record_cache_write, record_decode_failure,
    record_dropped_anlagen, record_fetch_failure, record_fetch_success,
};
use protokoll_transport::{
    Credentials, Endpoint, FetchConfig, FetchError, ProtokollFetcher, TransportKind, normalize_vn,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Instrument, error, warn};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> ExitCode {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 初始化结构化日志
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("fetch") if args.len() == 2 => run_fetch(&args[1]).await,
        Some("show") if args.len() == 2 => run_show(&args[1]),
        Some("recent") if args.len() == 1 => run_recent(),
        Some("list") if args.len() == 1 => run_list(),
        Some("delete") if args.len() == 2 => run_delete(&args[1]),
        Some("clear") if args.len() == 1 => run_clear(),
        _ => {
            print_usage();
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("protokoll-cli <befehl>");
    eprintln!("  fetch <vn>    Protokoll vom Server holen, cachen und anzeigen");
    eprintln!("  show <vn>     Protokoll aus dem Cache anzeigen");
    eprintln!("  recent        zuletzt gecachtes Protokoll anzeigen");
    eprintln!("  list          gecachte Vertragsnummern auflisten");
    eprintln!("  delete <vn>   Cache-Eintrag löschen");
    eprintln!("  clear         Cache leeren");
}

/// 合同号 → 缓存键（规范化 + 文件名净化）。
fn cache_key_for(vn: &str) -> String {
    safe_name(&normalize_vn(vn))
}

async fn run_fetch(vn: &str) -> CommandResult {
    let config = AppConfig::from_env()?;
    if config.key_source == KeySource::Fallback {
        warn!("PROTOKOLL_KEY not set — using built-in fallback key (insecure, legacy deployments only)");
    }
    let key = resolve_key(&config.key)?;

    let fetcher = ProtokollFetcher::new(
        FetchConfig {
            endpoint: Endpoint {
                host: config.host.clone(),
                port: config.port,
            },
            credentials: Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            },
            transport: match config.transport {
                TransportSetting::Http => TransportKind::Http,
                TransportSetting::Socket => TransportKind::Socket,
            },
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            read_timeout: Duration::from_millis(config.read_timeout_ms),
        },
        key,
    );

    let ids = new_request_ids();
    let span = tracing::info_span!(
        "fetch",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        vn = %vn
    );
    let plain = match fetcher.fetch(vn).instrument(span).await {
        Ok(plain) => {
            record_fetch_success();
            plain
        }
        Err(err) => {
            record_fetch_failure();
            report_fetch_hint(&err);
            return Err(err.into());
        }
    };

    let text = String::from_utf8_lossy(&plain).into_owned();
    let store = ProtokollStore::new(&config.cache_dir);
    let cache_key = cache_key_for(vn);
    // 解码失败也要先落盘，便于排查服务端 schema 漂移
    store.save(&cache_key, &text)?;
    record_cache_write();

    let env = match decode(&text) {
        Ok(env) => env,
        Err(err) => {
            record_decode_failure();
            error!(
                error = %err,
                cache_key = %cache_key,
                "decode failed; raw payload kept in cache for inspection"
            );
            return Err(err.into());
        }
    };

    let c = to_construct(&env);
    if c.dropped_anlagen > 0 {
        record_dropped_anlagen(c.dropped_anlagen as u64);
    }
    print_summary(&cache_key, &c);
    Ok(())
}

/// 每类错误一条用户可执行的提示（重试/检查密钥/修配置）。
fn report_fetch_hint(err: &FetchError) {
    match err {
        FetchError::Config(msg) => {
            error!(error = %msg, "configuration incomplete — fix settings before retrying");
        }
        FetchError::Crypto(_) => {
            error!("decrypt failed — check the configured key");
        }
        FetchError::Decompress(_) => {
            error!("payload decompression failed after decrypt");
        }
        FetchError::Connection(_)
        | FetchError::Io(_)
        | FetchError::Timeout(_)
        | FetchError::HttpStatus { .. }
        | FetchError::Http(_)
        | FetchError::FrameLength(_)
        | FetchError::EmptyBody => {
            error!("transport failure — retry once the server is reachable");
        }
    }
}

fn run_show(vn: &str) -> CommandResult {
    let store = ProtokollStore::new(cache_dir_from_env());
    let cache_key = cache_key_for(vn);
    let Some(json) = store.load(&cache_key)? else {
        return Err(format!("kein Cache-Eintrag für {cache_key}").into());
    };
    summarize_cached(&cache_key, &json)
}

fn run_recent() -> CommandResult {
    let store = ProtokollStore::new(cache_dir_from_env());
    let Some((cache_key, json)) = store.load_most_recent()? else {
        return Err("Cache ist leer".into());
    };
    summarize_cached(&cache_key, &json)
}

fn summarize_cached(cache_key: &str, json: &str) -> CommandResult {
    let env = match decode(json) {
        Ok(env) => env,
        Err(err) => {
            record_decode_failure();
            return Err(err.into());
        }
    };
    let c = to_construct(&env);
    print_summary(cache_key, &c);
    Ok(())
}

fn run_list() -> CommandResult {
    let store = ProtokollStore::new(cache_dir_from_env());
    let keys = store.list()?;
    if keys.is_empty() {
        println!("Cache ist leer");
        return Ok(());
    }
    for key in keys {
        println!("{key}");
    }
    Ok(())
}

fn run_delete(vn: &str) -> CommandResult {
    let store = ProtokollStore::new(cache_dir_from_env());
    let cache_key = cache_key_for(vn);
    if store.delete(&cache_key)? {
        println!("gelöscht: {cache_key}");
    } else {
        println!("kein Cache-Eintrag für {cache_key}");
    }
    Ok(())
}

fn run_clear() -> CommandResult {
    let store = ProtokollStore::new(cache_dir_from_env());
    let removed = store.clear()?;
    println!("{removed} Cache-Eintrag/Einträge entfernt");
    Ok(())
}

fn print_summary(cache_key: &str, c: &ProtokollConstruct) {
    println!("Protokoll {} ({} / {})", c.vn, c.p_type, c.w_type);
    if !c.kunde.is_empty() {
        println!("Kunde: {}", c.kunde);
    }
    println!("Cache-Key: {cache_key}");
    for anlage in &c.anlagen {
        let melder = &anlage.melder;
        let hardware = anlage
            .hardware
            .as_ref()
            .map(|t| format!(", Hardware {}x{}", t.rows.len(), t.editors.len()))
            .unwrap_or_default();
        println!(
            "  Anlage {}: Melder {}x{}{}",
            anlage.name,
            melder.rows.len(),
            melder.editors.len(),
            hardware
        );
    }
    if c.dropped_anlagen > 0 {
        println!(
            "  ({} Anlage(n) ohne Melder-Tabelle übersprungen)",
            c.dropped_anlagen
        );
    }
}
