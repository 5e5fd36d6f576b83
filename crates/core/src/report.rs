//! Report sinks: the logging hook invoked on every enqueue.
//!
//! The core never depends on sink state; a sink is a side-effecting
//! collaborator. The default writes a structured tracing line, the
//! collecting [`Report`] retains lines for an end-of-run summary.

use crate::Event;
use indexmap::IndexMap;
use parking_lot::Mutex;
use sagasim_types::{Round, ServiceId};

/// Hook invoked for every event handed to a mailbox.
pub trait ReportSink: Send + Sync {
    /// Record that `event` was enqueued for `service` at `round`.
    fn record(&self, service: ServiceId, round: Round, event: &Event);
}

impl<S: ReportSink + ?Sized> ReportSink for std::sync::Arc<S> {
    fn record(&self, service: ServiceId, round: Round, event: &Event) {
        (**self).record(service, round, event);
    }
}

/// Sink that forwards every delivery to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TraceSink;

impl ReportSink for TraceSink {
    fn record(&self, service: ServiceId, round: Round, event: &Event) {
        tracing::debug!(
            %service,
            %round,
            txid = %event.txid,
            from = %event.from,
            endpoint = %event.endpoint,
            stage = event.stage,
            phase = %event.phase,
            deliver_at = %event.round,
            "enqueue",
        );
    }
}

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub round: Round,
    pub line: String,
}

/// Sink that collects formatted lines per service for later printing.
#[derive(Debug, Default)]
pub struct Report {
    table: Mutex<IndexMap<ServiceId, Vec<ReportLine>>>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines recorded for one service, in delivery order.
    pub fn lines_for(&self, service: ServiceId) -> Vec<ReportLine> {
        self.table
            .lock()
            .get(&service)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of recorded deliveries.
    pub fn len(&self) -> usize {
        self.table.lock().values().map(Vec::len).sum()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write every recorded line to `out`, grouped by service.
    pub fn write_all(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        let table = self.table.lock();
        for (service, lines) in table.iter() {
            for entry in lines {
                writeln!(out, "[{}] {}: {}", entry.round, service, entry.line)?;
            }
        }
        Ok(())
    }
}

impl ReportSink for Report {
    fn record(&self, service: ServiceId, round: Round, event: &Event) {
        let line = format!(
            "{} {} -> {} {}/{} phase={} state={}",
            event.txid, event.from, event.to, event.endpoint, event.stage, event.phase, event.state,
        );
        self.table
            .lock()
            .entry(service)
            .or_default()
            .push(ReportLine { round, line });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagasim_types::TxId;

    #[test]
    fn test_report_collects_per_service() {
        let report = Report::new();
        let mut event = Event::new(TxId::new("7"));
        event.to = ServiceId::Order;
        event.endpoint = "order".to_owned();

        report.record(ServiceId::Order, Round(3), &event);
        report.record(ServiceId::Order, Round(4), &event);
        report.record(ServiceId::Payment, Round(4), &event);

        assert_eq!(report.len(), 3);
        let lines = report.lines_for(ServiceId::Order);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].round, Round(3));
        assert!(lines[0].line.contains("tx-7"));

        let mut buf = Vec::new();
        report.write_all(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("[r3] order: tx-7"));
    }
}
