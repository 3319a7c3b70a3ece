use std::io::{IsTerminal, Write};
use std::path::Path;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use fifolink_link::LinkEntry;
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    schema_id: &'a str,
    name: &'a str,
    size: usize,
    payload: String,
}

#[derive(Serialize)]
struct LinkOutput<'a> {
    name: &'a str,
    request: bool,
    ack: bool,
}

#[derive(Serialize)]
struct LinkListOutput<'a> {
    schema_id: &'a str,
    dir: String,
    links: Vec<LinkOutput<'a>>,
}

/// Print a received message. `Raw` writes the payload bytes unchanged.
pub fn print_message(name: &str, payload: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                schema_id: "https://schemas.3leaps.dev/fifolink/cli/v1/message-received.schema.json",
                name,
                size: payload.len(),
                payload: payload_preview(payload),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LINK", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    name.to_string(),
                    payload.len().to_string(),
                    payload_preview(payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "link={} size={} payload={}",
                name,
                payload.len(),
                payload_preview(payload)
            );
        }
        OutputFormat::Raw => print_raw(payload),
    }
}

pub fn print_links(dir: &Path, links: &[LinkEntry], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = LinkListOutput {
                schema_id: "https://schemas.3leaps.dev/fifolink/cli/v1/link-list.schema.json",
                dir: dir.display().to_string(),
                links: links
                    .iter()
                    .map(|link| LinkOutput {
                        name: &link.name,
                        request: link.request,
                        ack: link.ack,
                    })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LINK", "REQ", "ACK", "STATE"]);
            for link in links {
                table.add_row(vec![
                    link.name.clone(),
                    presence(link.request).to_string(),
                    presence(link.ack).to_string(),
                    state(link).to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for link in links {
                println!(
                    "{} req={} ack={} ({})",
                    link.name,
                    presence(link.request),
                    presence(link.ack),
                    state(link)
                );
            }
        }
        OutputFormat::Raw => {
            for link in links {
                println!("{}", link.name);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn presence(present: bool) -> &'static str {
    if present {
        "yes"
    } else {
        "no"
    }
}

fn state(link: &LinkEntry) -> &'static str {
    if link.is_complete() {
        "ready"
    } else {
        "partial"
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_json_has_schema_id_and_size() {
        let out = MessageOutput {
            schema_id: "x",
            name: "c2p",
            size: 11,
            payload: payload_preview(b"Hello World"),
        };
        let json = serde_json::to_value(&out).expect("message output should serialize");
        assert_eq!(json["size"], 11);
        assert_eq!(json["payload"], "Hello World");
        assert!(json.get("schema_id").is_some());
    }

    #[test]
    fn binary_payload_is_summarized() {
        assert_eq!(payload_preview(&[0xff, 0xfe]), "<binary 2 bytes>");
    }

    #[test]
    fn partial_link_state() {
        let link = LinkEntry {
            name: "p2c".to_string(),
            request: true,
            ack: false,
        };
        assert_eq!(state(&link), "partial");
    }
}
