//! Telemetry sink interface.
//!
//! The simulation engine holds a `TelemetrySink` for the duration of a run
//! and calls it synchronously from its event loop, in the order it
//! processes the underlying events. Implementations must not block.

/// Terminal identity assigned by the simulation engine (IMSI)
pub type Imsi = u64;

/// Cell identity as reported by the simulation engine
pub type CellId = u16;

/// Receiver of per-terminal radio telemetry and mobility events
pub trait TelemetrySink {
    /// A channel-quality sample with SINR as a linear ratio
    fn on_channel_sample(&mut self, imsi: Imsi, sinr_linear: f64);

    /// A reference signal received power report (dBm)
    fn on_rsrp(&mut self, imsi: Imsi, cell: CellId, rsrp_dbm: f64);

    /// A reference signal received quality report (dB)
    fn on_rsrq(&mut self, imsi: Imsi, cell: CellId, rsrq_db: f64);

    fn on_handover_start(&mut self, imsi: Imsi, source: CellId, target: CellId);

    fn on_handover_success(&mut self, imsi: Imsi, source: CellId, target: CellId);

    fn on_handover_failure(&mut self, imsi: Imsi, source: CellId, target: CellId);
}
