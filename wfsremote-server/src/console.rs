//! wfsremote-server/src/console.rs
//!
//! Line commands read from stdin, standing in for the touch UI:
//!   update <address> <target> <args...>   queue a throttled update
//!   send <address> <args...>              send once, unthrottled
//!   apply <in> <out> <host> [password]    replace the network settings
//!   start | stop | restart
//!   status
//!   config
//!   help
//!   quit
//!
//! Arguments are typed as `i:3`, `f:-1.5` or `s:inc`; untagged tokens are
//! read as an int, then a float, then a string.

use std::net::Ipv4Addr;
use std::sync::Arc;

use wfsremote_common::models::{NetworkConfig, OscArgument, OscMessage, ParameterKey};
use wfsremote_osc::RemoteApi;

const HELP: &str = r#"Commands:
  update <address> <target> <args...>   (target 0 = global)
  send <address> <args...>
  apply <incoming port> <outgoing port> <remote host> [password]
  start
  stop
  restart
  status
  config
  help
  quit
"#;

/// Runs one console line. Returns `(quit_requested, output)`.
pub async fn dispatch(line: &str, api: &Arc<dyn RemoteApi>) -> (bool, Option<String>) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&cmd, args)) = parts.split_first() else {
        return (false, None);
    };

    let output = match cmd.to_lowercase().as_str() {
        "quit" | "exit" => return (true, None),
        "help" => HELP.to_string(),
        "update" => handle_update(args, api),
        "send" => handle_send(args, api).await,
        "apply" => handle_apply(args, api).await,
        "start" => match api.osc_start().await {
            Ok(port) => format!("OSC started on UDP {port}."),
            Err(e) => format!("Error => {e}"),
        },
        "stop" => match api.osc_stop().await {
            Ok(()) => "OSC stopped.".to_string(),
            Err(e) => format!("Error => {e}"),
        },
        "restart" => match api.osc_restart().await {
            Ok(port) => format!("OSC restarted on UDP {port}."),
            Err(e) => format!("Error => {e}"),
        },
        "status" => {
            let st = api.osc_status().await;
            format!(
                "OSC running={} incoming={} remote={} pending={}",
                st.is_running,
                st.incoming_port
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".into()),
                st.remote_target,
                st.pending_updates
            )
        }
        "config" => describe_config(&api.osc_config()),
        other => format!("Unknown command '{other}'. Type 'help' for a list."),
    };
    (false, Some(output))
}

fn handle_update(args: &[&str], api: &Arc<dyn RemoteApi>) -> String {
    let [address, target, values @ ..] = args else {
        return "Usage: update <address> <target> <args...>".to_string();
    };
    if !address.starts_with('/') {
        return format!("Address '{address}' must start with '/'.");
    }
    let target: i32 = match target.parse() {
        Ok(t) => t,
        Err(_) => return format!("Target '{target}' is not an integer."),
    };
    let values = match parse_arguments(values) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let key = ParameterKey::new(*address, target);
    let shown = format!("{key} {}", join_arguments(&values));
    api.osc_update(key, values);
    format!("(queued) {}", shown.trim_end())
}

async fn handle_send(args: &[&str], api: &Arc<dyn RemoteApi>) -> String {
    let [address, values @ ..] = args else {
        return "Usage: send <address> <args...>".to_string();
    };
    let values = match parse_arguments(values) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let message = OscMessage::new(*address, values);
    match api.osc_send(message.clone()).await {
        Ok(()) => format!("(sent) {message}"),
        Err(e) => format!("Error => {e}"),
    }
}

async fn handle_apply(args: &[&str], api: &Arc<dyn RemoteApi>) -> String {
    let (incoming, outgoing, host, password) = match args {
        [i, o, h] => (i, o, h, None),
        [i, o, h, p] => (i, o, h, Some(p.to_string())),
        _ => return "Usage: apply <incoming port> <outgoing port> <remote host> [password]".to_string(),
    };
    let Ok(incoming_port) = incoming.parse::<u16>() else {
        return format!("Bad incoming port '{incoming}'.");
    };
    let Ok(outgoing_port) = outgoing.parse::<u16>() else {
        return format!("Bad outgoing port '{outgoing}'.");
    };
    let Ok(remote_host) = host.parse::<Ipv4Addr>() else {
        return format!("Bad remote host '{host}', expected an IPv4 address.");
    };

    let config = NetworkConfig {
        incoming_port,
        outgoing_port,
        remote_host,
        find_device_password: password,
    };
    match api.osc_apply_settings(config).await {
        Ok(port) => format!("Settings applied; listening on UDP {port}."),
        Err(e) => format!("Error => {e}"),
    }
}

fn parse_arguments(tokens: &[&str]) -> Result<Vec<OscArgument>, String> {
    tokens
        .iter()
        .map(|tok| {
            tok.parse::<OscArgument>()
                .map_err(|e| format!("Bad argument '{tok}': {e}"))
        })
        .collect()
}

fn join_arguments(values: &[OscArgument]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe_config(cfg: &NetworkConfig) -> String {
    format!(
        "incoming={} outgoing={} remote={} password={}",
        cfg.incoming_port,
        cfg.outgoing_port,
        cfg.remote_host,
        if cfg.find_device_password.as_deref().is_some_and(|p| !p.is_empty()) {
            "set"
        } else {
            "none"
        }
    )
}
