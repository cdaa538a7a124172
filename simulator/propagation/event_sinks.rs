//! Event sinks for propagation runs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bp_rust::{Event, EventSink, NodeIndex, SUPER_NODE_INDEX};

/// Short label for a node; the super-node prints as `hub`
pub fn node_label(node: NodeIndex) -> String {
    if node == SUPER_NODE_INDEX {
        "hub".to_string()
    } else {
        node.to_string()
    }
}

// ============================================================================
// Console Logging Sink
// ============================================================================

/// Logging event sink that outputs events to console
pub struct ConsoleEventSink {
    enabled: bool,
}

impl ConsoleEventSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl EventSink for ConsoleEventSink {
    fn log(&mut self, tick: u64, node: NodeIndex, event: Event) {
        if !self.enabled {
            return;
        }

        let node = node_label(node);
        match event {
            Event::Offered {
                source,
                negotiated_bandwidth,
            } => {
                println!(
                    "{:>6} {:>6} Offered          from:{} bw:{}",
                    tick,
                    node,
                    node_label(source),
                    negotiated_bandwidth
                );
            }
            Event::TransferStarted {
                height,
                active_bandwidth,
            } => {
                println!(
                    "{:>6} {:>6} TransferStarted  h:{} bw:{}",
                    tick, node, height, active_bandwidth
                );
            }
            Event::TransferCompleted {
                height,
                hop_count,
                elapsed,
            } => {
                println!(
                    "{:>6} {:>6} TransferDone     h:{} hops:{} t:{}ms",
                    tick, node, height, hop_count, elapsed
                );
            }
            Event::DuplicateRejected {
                height,
                height_reached,
            } => {
                println!(
                    "{:>6} {:>6} Duplicate        h:{} have:{}",
                    tick, node, height, height_reached
                );
            }
        }
    }
}

// ============================================================================
// CSV Event Sink
// ============================================================================

/// CSV event sink for structured data export
pub struct CsvEventSink {
    writer: BufWriter<File>,
}

impl CsvEventSink {
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "tick,node,event_type,height,related_node,value")?;

        Ok(Self { writer })
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl EventSink for CsvEventSink {
    fn log(&mut self, tick: u64, node: NodeIndex, event: Event) {
        let node = node_label(node);
        let result = match event {
            Event::Offered {
                source,
                negotiated_bandwidth,
            } => writeln!(
                self.writer,
                "{},{},Offered,,{},{}",
                tick,
                node,
                node_label(source),
                negotiated_bandwidth
            ),
            Event::TransferStarted {
                height,
                active_bandwidth,
            } => writeln!(
                self.writer,
                "{},{},TransferStarted,{},,{}",
                tick, node, height, active_bandwidth
            ),
            Event::TransferCompleted {
                height, elapsed, ..
            } => writeln!(
                self.writer,
                "{},{},TransferCompleted,{},,{}",
                tick, node, height, elapsed
            ),
            Event::DuplicateRejected {
                height,
                height_reached,
            } => writeln!(
                self.writer,
                "{},{},DuplicateRejected,{},,{}",
                tick, node, height, height_reached
            ),
        };

        if let Err(e) = result {
            eprintln!("Error writing to CSV: {}", e);
        }
    }
}

impl Drop for CsvEventSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

// ============================================================================
// Multi Sink (Combine Multiple Sinks)
// ============================================================================

/// Combines multiple event sinks
pub struct MultiEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl MultiEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for MultiEventSink {
    fn log(&mut self, tick: u64, node: NodeIndex, event: Event) {
        for sink in &mut self.sinks {
            sink.log(tick, node, event.clone());
        }
    }
}
