// ABOUTME: Output formatting for CLI listings.
// ABOUTME: Supports aligned tables and JSON.

use dockhand::engine::EngineConnection;
use dockhand::types::{ContainerRecord, PodRef};
use serde::Serialize;
use std::sync::Arc;

/// Output mode for CLI listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly aligned columns
    Table,
    /// A JSON array for scripting
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// An engine row with its reachability.
#[derive(Debug, Serialize)]
pub struct EngineStatus {
    #[serde(flatten)]
    pub connection: EngineConnection,
    pub socket: String,
    pub reachable: bool,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn engines(&self, engines: &[EngineStatus]) {
        if self.mode == OutputMode::Json {
            return print_json(engines);
        }

        let rows = engines
            .iter()
            .map(|e| {
                vec![
                    e.connection.id.to_string(),
                    e.connection.engine_type.to_string(),
                    e.connection.name.clone(),
                    e.socket.clone(),
                    if e.reachable { "up" } else { "down" }.to_string(),
                ]
            })
            .collect();
        print_table(&["ENGINE ID", "TYPE", "NAME", "SOCKET", "STATUS"], rows);
    }

    pub fn containers(&self, containers: &[Arc<ContainerRecord>]) {
        if self.mode == OutputMode::Json {
            let records: Vec<&ContainerRecord> = containers.iter().map(Arc::as_ref).collect();
            return print_json(&records);
        }

        let rows = containers
            .iter()
            .map(|c| {
                let ports: Vec<String> = c.ports.iter().map(ToString::to_string).collect();
                vec![
                    c.short_id().to_string(),
                    c.name().to_string(),
                    c.image.clone(),
                    c.status.clone().unwrap_or_else(|| c.state.to_string()),
                    ports.join(", "),
                    c.pod.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
                    c.engine_id.to_string(),
                ]
            })
            .collect();
        print_table(
            &["CONTAINER ID", "NAME", "IMAGE", "STATUS", "PORTS", "POD", "ENGINE"],
            rows,
        );
    }

    pub fn pods(&self, pods: &[PodRef]) {
        if self.mode == OutputMode::Json {
            return print_json(pods);
        }

        let rows = pods
            .iter()
            .map(|p| {
                vec![
                    p.id.as_str().get(..12).unwrap_or(p.id.as_str()).to_string(),
                    p.name.clone(),
                    p.status.clone(),
                    p.engine_id.to_string(),
                ]
            })
            .collect();
        print_table(&["POD ID", "NAME", "STATUS", "ENGINE"], rows);
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: failed to encode JSON: {e}"),
    }
}

fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        line.join("   ").trim_end().to_string()
    };

    println!("{}", render(headers.to_vec()));
    for row in &rows {
        println!("{}", render(row.iter().map(String::as_str).collect()));
    }
}
