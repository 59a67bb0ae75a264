//! Slash command handlers.
//!
//! Every handler performs exactly one probe call and hands the result to a
//! pure formatter, so formatting can be tested without any transport.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::commands::CommandContext;
use crate::probe::{LivenessResult, MachineStatus, ServerAddress};

pub const SERVER_DOWN: &str = "🔴 Nope, the server is down 😔";
pub const PLAYERS_SERVER_DOWN: &str = "🔴 The server is down, so nobody can play yet 😔";
pub const INFO_SERVER_DOWN: &str = "🔴 The server is down, so there is no info to show 😔";
pub const NOBODY_ONLINE: &str = "🟢 The server is up but nobody is online yet 😶";
pub const MACHINE_TOKEN_MISSING: &str = "❌ Machine status token is not configured.";
pub const MACHINE_UNREACHABLE: &str = "🔴 Failed to fetch machine status 😔";
pub const MACHINE_NOT_CONFIGURED: &str = "❌ Machine status is not configured.";

/// Discord rejects message content longer than this many characters.
pub const MESSAGE_LIMIT: usize = 2000;

pub fn check_liveness(ctx: &CommandContext) -> BoxFuture<'_, String> {
    async move { format_liveness(&ctx.probe.check(&ctx.address).await) }.boxed()
}

pub fn list_players(ctx: &CommandContext) -> BoxFuture<'_, String> {
    async move { format_players(&ctx.probe.check(&ctx.address).await) }.boxed()
}

pub fn server_info(ctx: &CommandContext) -> BoxFuture<'_, String> {
    async move { format_server_info(&ctx.address, &ctx.probe.check(&ctx.address).await) }.boxed()
}

pub fn machine_detail(ctx: &CommandContext) -> BoxFuture<'_, String> {
    async move {
        let Some(machine) = &ctx.machine else {
            return MACHINE_NOT_CONFIGURED.to_string();
        };
        let Some(token) = machine.token.as_deref() else {
            return MACHINE_TOKEN_MISSING.to_string();
        };
        match machine.probe.fetch(token).await {
            Some(status) => format_machine(&status),
            None => MACHINE_UNREACHABLE.to_string(),
        }
    }
    .boxed()
}

pub fn format_liveness(result: &LivenessResult) -> String {
    if !result.online {
        return SERVER_DOWN.to_string();
    }

    let (online, max) = result
        .players
        .as_ref()
        .map_or((0, 0), |p| (p.online, p.max));
    let motd = result.motd.as_deref().unwrap_or("no MOTD");

    format!("🟢 The server is up!\n{online}/{max} players online.\n\nMOTD: {motd}")
}

pub fn format_players(result: &LivenessResult) -> String {
    if !result.online {
        return PLAYERS_SERVER_DOWN.to_string();
    }

    let Some(players) = result.players.as_ref().filter(|p| !p.list.is_empty()) else {
        return NOBODY_ONLINE.to_string();
    };

    let header = format!(
        "🎮 {}/{} players online!\n\nOnline right now:\n",
        players.online, players.max
    );
    let names: Vec<String> = players.list.iter().map(|p| p.name.clone()).collect();
    let budget = MESSAGE_LIMIT.saturating_sub(char_len(&header));
    let names = bullet_list(&names, budget).unwrap_or_default();

    format!("{header}{names}")
}

pub fn format_server_info(address: &ServerAddress, result: &LivenessResult) -> String {
    if !result.online {
        return INFO_SERVER_DOWN.to_string();
    }

    let fields = InfoFields {
        address,
        motd: non_empty(result.motd.as_deref()).unwrap_or("No MOTD"),
        version: non_empty(result.version.as_deref()).unwrap_or("Unknown"),
        software: non_empty(result.software.as_deref()).unwrap_or("Not reported"),
        eula: if result.eula_blocked.unwrap_or(false) {
            "❌ Yes"
        } else {
            "✅ No"
        },
        srv: result.srv_record.as_deref().unwrap_or("None"),
        retrieved: result
            .retrieved_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
    };

    // Plugins get half of what the fixed lines leave; mods get the rest.
    let budget = MESSAGE_LIMIT.saturating_sub(char_len(&fields.render("", "")));
    let plugins = bullet_list(&result.plugins, budget / 2).unwrap_or_else(|| "No plugins".to_string());
    let budget = budget.saturating_sub(char_len(&plugins));
    let mods = bullet_list(&result.mods, budget).unwrap_or_else(|| "No mods".to_string());

    fields.render(&plugins, &mods)
}

struct InfoFields<'a> {
    address: &'a ServerAddress,
    motd: &'a str,
    version: &'a str,
    software: &'a str,
    eula: &'a str,
    srv: &'a str,
    retrieved: String,
}

impl InfoFields<'_> {
    fn render(&self, plugins: &str, mods: &str) -> String {
        format!(
            "📊 **Minecraft Server Info**\n\n\
             🌐 IP: `{address}`\n\
             📝 MOTD: {motd}\n\
             🧩 Version: {version}\n\
             ⚙️ Software: {software}\n\
             🔌 Plugins:\n{plugins}\n\
             📦 Mods:\n{mods}\n\
             📛 EULA blocked: {eula}\n\
             🔀 SRV record: {srv}\n\
             ⏱️ Retrieved at: {retrieved}",
            address = self.address,
            motd = self.motd,
            version = self.version,
            software = self.software,
            eula = self.eula,
            srv = self.srv,
            retrieved = self.retrieved,
        )
    }
}

pub fn format_machine(status: &MachineStatus) -> String {
    let info = &status.server_data;
    let usage = &status.data;
    let temps = &usage.temps;
    let network = &status.network;
    let interfaces = network
        .interfaces
        .iter()
        .map(|i| format!("• {}: {}", i.name, i.ip))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "📡 **Machine Status**\n\n\
         🟢 Status: **{status}**\n\
         ⏱️ Uptime: {uptime}\n\n\
         💻 **Host**\n\
         • Name: {name}\n\
         • CPU: {cpu}\n\
         • OS: {os}\n\n\
         📈 **Resource Usage**\n\
         • CPU: {cpu_pct:.1}%\n\
         • Memory: {mem:.2} GB / {total:.2} GB ({mem_pct:.1}%)\n\n\
         🌡️ **Temperatures**\n\
         • Motherboard: {mb}°C\n\
         • CPU: {cpu_t}°C\n\
         • GPU: {gpu_t}°C\n\n\
         🌍 **Network**\n\
         • Ping: {ping} ms\n\
         • Download: {down} Mbps\n\
         • Upload: {up} Mbps\n\
         • Interfaces:\n{interfaces}",
        status = status.server_status,
        uptime = status.server_uptime,
        name = info.server_name,
        cpu = info.server_cpu,
        os = info.server_os,
        cpu_pct = usage.cpu_percentage,
        mem = usage.memory,
        total = usage.total_memory,
        mem_pct = usage.memory_percentage,
        mb = temps.motherboard_temp,
        cpu_t = temps.cpu_temp,
        gpu_t = temps.gpu_temp,
        ping = network.ping_ms,
        down = network.speed_download_mbps,
        up = network.speed_upload_mbps,
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Bulleted lines within `budget` characters. Lines that do not fit are
/// replaced by an "…and N more" line.
fn bullet_list(items: &[String], budget: usize) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let lines: Vec<String> = items.iter().map(|item| format!("• {item}")).collect();
    let full = lines.join("\n");
    if char_len(&full) <= budget {
        return Some(full);
    }

    let mut kept = lines.len();
    loop {
        kept -= 1;
        let mut text = lines[..kept].join("\n");
        if kept > 0 {
            text.push('\n');
        }
        text.push_str(&format!("…and {} more", lines.len() - kept));
        if kept == 0 || char_len(&text) <= budget {
            return Some(text);
        }
    }
}

/// Cut `reply` to the chat message limit.
pub fn fit_message(reply: String) -> String {
    if char_len(&reply) <= MESSAGE_LIMIT {
        return reply;
    }
    let mut cut: String = reply.chars().take(MESSAGE_LIMIT - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::types::{
        MachineInfo, NetworkInterface, NetworkStatus, Player, Players, ResourceUsage, Temperatures,
    };
    use chrono::{TimeZone, Utc};

    fn online() -> LivenessResult {
        LivenessResult {
            online: true,
            players: Some(Players {
                online: 2,
                max: 10,
                list: vec![Player { name: "Steve".into() }, Player { name: "Alex".into() }],
            }),
            motd: Some("Welcome".into()),
            version: Some("1.20.4".into()),
            software: Some("Paper".into()),
            plugins: vec!["EssentialsX 2.20".into()],
            eula_blocked: Some(false),
            retrieved_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_liveness_online() {
        assert_eq!(
            format_liveness(&online()),
            "🟢 The server is up!\n2/10 players online.\n\nMOTD: Welcome"
        );
    }

    #[test]
    fn test_liveness_online_without_metadata() {
        let result = LivenessResult { online: true, ..Default::default() };
        assert_eq!(
            format_liveness(&result),
            "🟢 The server is up!\n0/0 players online.\n\nMOTD: no MOTD"
        );
    }

    #[test]
    fn test_offline_replies() {
        let offline = LivenessResult::offline();
        let address = ServerAddress::new("mc.test", 25565);
        assert_eq!(format_liveness(&offline), SERVER_DOWN);
        assert_eq!(format_players(&offline), PLAYERS_SERVER_DOWN);
        assert_eq!(format_server_info(&address, &offline), INFO_SERVER_DOWN);
    }

    #[test]
    fn test_players_listed() {
        assert_eq!(
            format_players(&online()),
            "🎮 2/10 players online!\n\nOnline right now:\n• Steve\n• Alex"
        );
    }

    #[test]
    fn test_players_empty_list() {
        let mut result = online();
        result.players.as_mut().unwrap().list.clear();
        assert_eq!(format_players(&result), NOBODY_ONLINE);

        result.players = None;
        assert_eq!(format_players(&result), NOBODY_ONLINE);
    }

    #[test]
    fn test_server_info_fallbacks() {
        let address = ServerAddress::new("mc.test", 25565);
        let text = format_server_info(&address, &online());

        assert!(text.contains("🌐 IP: `mc.test:25565`"));
        assert!(text.contains("🧩 Version: 1.20.4"));
        assert!(text.contains("🔌 Plugins:\n• EssentialsX 2.20\n"));
        assert!(text.contains("📦 Mods:\nNo mods\n"));
        assert!(text.contains("📛 EULA blocked: ✅ No"));
        assert!(text.contains("🔀 SRV record: None"));
        assert!(text.ends_with("⏱️ Retrieved at: 2024-05-01 12:30:00 UTC"));
    }

    #[test]
    fn test_machine_format() {
        let status = MachineStatus {
            server_status: "online".into(),
            server_uptime: "3 days".into(),
            server_data: MachineInfo {
                server_name: "box".into(),
                server_cpu: "Ryzen 5".into(),
                server_os: "Linux".into(),
            },
            data: ResourceUsage {
                cpu_percentage: 12.345,
                memory: 7.5,
                total_memory: 16.0,
                memory_percentage: 46.875,
                temps: Temperatures {
                    motherboard_temp: 40.0,
                    cpu_temp: 55.5,
                    gpu_temp: 48.0,
                },
            },
            network: NetworkStatus {
                public_ip: None,
                ping_ms: 12.0,
                speed_download_mbps: 250.5,
                speed_upload_mbps: 40.0,
                interfaces: vec![NetworkInterface { name: "eth0".into(), ip: "10.0.0.2".into() }],
            },
        };

        let text = format_machine(&status);
        assert!(text.contains("🟢 Status: **online**"));
        assert!(text.contains("• CPU: 12.3%"));
        assert!(text.contains("• Memory: 7.50 GB / 16.00 GB (46.9%)"));
        assert!(text.contains("• CPU: 55.5°C"));
        assert!(text.contains("• Motherboard: 40°C"));
        assert!(text.ends_with("• Interfaces:\n• eth0: 10.0.0.2"));
    }

    fn many(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{prefix}_{i:03}_with_a_longer_name")).collect()
    }

    #[test]
    fn test_long_player_list_fits_message_limit() {
        let mut result = online();
        let names = many("Player", 120);
        result.players = Some(Players {
            online: 120,
            max: 200,
            list: names.iter().map(|name| Player { name: name.clone() }).collect(),
        });

        let text = format_players(&result);
        assert!(text.chars().count() <= MESSAGE_LIMIT, "{}", text.chars().count());
        assert!(text.starts_with("🎮 120/200 players online!"));
        assert!(text.contains("• Player_000_with_a_longer_name\n"));

        let shown = text.lines().filter(|l| l.starts_with("• ")).count();
        assert!(text.ends_with(&format!("…and {} more", 120 - shown)));
    }

    #[test]
    fn test_long_plugin_and_mod_lists_fit_message_limit() {
        let mut result = online();
        result.plugins = many("Plugin", 90);
        result.mods = many("Mod", 90);
        let address = ServerAddress::new("mc.test", 25565);

        let text = format_server_info(&address, &result);
        assert!(text.chars().count() <= MESSAGE_LIMIT, "{}", text.chars().count());
        assert!(text.contains("🔌 Plugins:\n• Plugin_000_with_a_longer_name\n"));
        assert!(text.contains("📦 Mods:\n• Mod_000_with_a_longer_name\n"));
        assert_eq!(text.matches("…and ").count(), 2);
        assert!(text.ends_with("⏱️ Retrieved at: 2024-05-01 12:30:00 UTC"));
    }

    #[test]
    fn test_bullet_list_with_no_room_keeps_the_count() {
        let items = many("Plugin", 3);
        assert_eq!(bullet_list(&items, 5).as_deref(), Some("…and 3 more"));
        assert_eq!(bullet_list(&[], 5), None);
    }

    #[test]
    fn test_fit_message_caps_length() {
        let short = "short reply".to_string();
        assert_eq!(fit_message(short.clone()), short);

        let long = "é".repeat(MESSAGE_LIMIT + 50);
        let fitted = fit_message(long);
        assert_eq!(fitted.chars().count(), MESSAGE_LIMIT);
        assert!(fitted.ends_with('…'));
    }
}
