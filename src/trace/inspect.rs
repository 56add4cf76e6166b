use crate::timeline::LockerInfo;

/// Timestamps are printed modulo this, enough to tell entries of one track apart
const TIME_WRAP_MS: f64 = 100_000.0;

/// Render a track and all of its entries as text, one entry per line
pub fn format_track(locker: &LockerInfo) -> String {
    let mut out = format!("Locker{} {}\n", locker.id, locker.info);

    for entry in &locker.protocol {
        let time = format!("{:.0}", entry.time % TIME_WRAP_MS);
        let conflicts = entry
            .conflicting_lockers
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        out.push_str(&format!(
            "{:>6}ms: {} {} {}\n",
            time,
            entry.entry_type,
            entry.extra_info().unwrap_or(""),
            conflicts
        ));
    }

    out
}
