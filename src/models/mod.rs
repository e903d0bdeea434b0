//! Domain models for the extraction pipeline
//!
//! Raw notes, per-record extraction results, the enriched and longitudinal
//! tables, and the flat table view handed to consumers.

pub mod enriched;
pub mod extraction;
pub mod longitudinal;
pub mod record;
pub mod table;

pub use enriched::{EnrichedRecord, EnrichedTable, ExtractionLayout, ProcessingReport};
pub use extraction::{
    BiologicSummary, ComorbidityFlags, DrugUsage, MarkerReading, MethotrexateDetail,
    PriorBiologic, RecordExtraction, RheumatoidFactor, RheumatoidOrigin, RheumatoidResult, Route,
    TherapyPlan, UsageStatus,
};
pub use longitudinal::{BaselineProfile, LongitudinalRecord, LongitudinalTable, MarkerPair};
pub use record::RawRecord;
pub use table::{BASELINE_SUFFIX, Cell, FOLLOWUP_SUFFIX, Table};
