use chart_etl::{Lexicon, PipelineConfig, RawRecord, RawTable};
use chrono::{NaiveDate, NaiveDateTime};

/// Columns of the fixture tables
pub const COLUMNS: [&str; 6] = ["paciente", "tipo", "data_hora", "descricao", "idade", "sexo"];

/// Standard lexicon
#[must_use]
pub fn lexicon() -> Lexicon {
    Lexicon::standard().expect("standard lexicon compiles")
}

/// Default configuration with sequential extraction
#[must_use]
pub fn config() -> PipelineConfig {
    PipelineConfig::builder().parallel(false).build()
}

/// Midnight of the given date
#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

/// A record with a timestamp and narrative
#[must_use]
pub fn record(patient: &str, record_type: &str, at: NaiveDateTime, narrative: &str) -> RawRecord {
    RawRecord::new(patient, record_type, Some(narrative)).with_timestamp(at)
}

/// Small cohort exercising every processing rule
///
/// - p1: intake and follow-up 59 days apart, HAQ 1.5 → 0.7, follow-up row duplicated
/// - p2: intake and follow-up, HAQ 2.0 → 1.9, discontinued etanercepte
/// - p3: intake and an exam but no follow-up, unparseable timestamp and age
/// - p4: a single follow-up only
#[must_use]
pub fn cohort_table() -> RawTable {
    let mut table = RawTable::new(COLUMNS);
    let rows: [[Option<&str>; 6]; 8] = [
        [
            Some("p1"),
            Some("ANAMNESE"),
            Some("2023-01-01 09:00:00"),
            Some("Paciente com HAS. FR positivo. Em uso de adalimumabe. HAQ: 1,5 DAS28 5,2"),
            Some("54"),
            Some("F"),
        ],
        [
            Some("p1"),
            Some("EVOLUCAO"),
            Some("2023-03-01 09:00:00"),
            Some("Segue com adalimumabe. HAQ: 0,7 DAS28 3,1"),
            Some("54"),
            Some("F"),
        ],
        [
            Some("p1"),
            Some("EVOLUCAO"),
            Some("2023-03-01 09:00:00"),
            Some("Segue com adalimumabe. HAQ: 0,7 DAS28 3,1"),
            Some("54"),
            Some("F"),
        ],
        [
            Some("p2"),
            Some("ANAMNESE"),
            Some("01/02/2023"),
            Some("Fez uso de etanercepte, suspenso por falha. HAQ 2,0"),
            Some("61 anos"),
            Some("M"),
        ],
        [
            Some("p2"),
            Some("EVOLUCAO"),
            Some("01/05/2023"),
            Some("HAQ 1,9"),
            Some("61"),
            Some("M"),
        ],
        [
            Some("p3"),
            Some("ANAMNESE"),
            Some("2023-01-10"),
            Some("CID10: M05.9. Sem queixas."),
            Some("desconhecida"),
            None,
        ],
        [
            Some("p3"),
            Some("EXAME"),
            Some("ontem"),
            Some("VHS 35"),
            None,
            None,
        ],
        [
            Some("p4"),
            Some("EVOLUCAO"),
            Some("2023-04-01"),
            Some("HAQ 1,0"),
            Some("40"),
            Some("F"),
        ],
    ];
    for row in rows {
        table.push_row(row);
    }
    table
}
