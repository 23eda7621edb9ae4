use once_cell::sync::Lazy;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    pub date: &'static str,
    pub name: &'static str,
}

pub const HOLIDAYS: &[Holiday] = &[
    Holiday { date: "2024-01-01", name: "New Year's Day" },
    Holiday { date: "2024-01-26", name: "Republic Day (India)" },
    Holiday { date: "2024-03-08", name: "Holi" },
    Holiday { date: "2024-04-11", name: "Eid al-Fitr" },
    Holiday { date: "2024-08-15", name: "Independence Day (India)" },
    Holiday { date: "2024-10-02", name: "Gandhi Jayanti" },
    Holiday { date: "2024-10-31", name: "Diwali" },
    Holiday { date: "2024-12-25", name: "Christmas" },
    Holiday { date: "2025-01-01", name: "New Year's Day" },
    Holiday { date: "2025-01-26", name: "Republic Day (India)" },
    Holiday { date: "2025-03-14", name: "Holi" },
    Holiday { date: "2025-04-10", name: "Eid al-Fitr" },
    Holiday { date: "2025-08-15", name: "Independence Day (India)" },
    Holiday { date: "2025-10-02", name: "Gandhi Jayanti" },
    Holiday { date: "2025-10-20", name: "Diwali" },
    Holiday { date: "2025-12-25", name: "Christmas" },
    Holiday { date: "2026-01-01", name: "New Year's Day" },
    Holiday { date: "2026-01-26", name: "Republic Day (India)" },
    Holiday { date: "2026-03-04", name: "Holi" },
    Holiday { date: "2026-03-31", name: "Eid al-Fitr" },
    Holiday { date: "2026-08-15", name: "Independence Day (India)" },
    Holiday { date: "2026-10-02", name: "Gandhi Jayanti" },
    Holiday { date: "2026-11-08", name: "Diwali" },
    Holiday { date: "2026-12-25", name: "Christmas" },
];

static HOLIDAY_MAP: Lazy<BTreeMap<&'static str, &'static str>> =
    Lazy::new(|| HOLIDAYS.iter().map(|h| (h.date, h.name)).collect());

pub fn holiday_map() -> &'static BTreeMap<&'static str, &'static str> {
    &HOLIDAY_MAP
}

pub fn holiday_for(date_key: &str) -> Option<&'static str> {
    HOLIDAY_MAP.get(date_key).copied()
}
