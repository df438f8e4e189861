use crate::model::Technician;
use anyhow::Context;
use csv::WriterBuilder;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Export JSON de la file (jolie mise en forme)
pub fn export_queue_json<P: AsRef<Path>>(path: P, techs: &[Technician]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let s = serde_json::to_string_pretty(techs)?;
    fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Export CSV de la file vers un fichier
pub fn export_queue_csv<P: AsRef<Path>>(path: P, techs: &[Technician]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_queue_csv(file, techs)
}

/// Header `queue_position,id,name,status,is_active,status_start_time`
pub fn write_queue_csv<W: Write>(out: W, techs: &[Technician]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record([
        "queue_position",
        "id",
        "name",
        "status",
        "is_active",
        "status_start_time",
    ])?;
    for t in techs {
        let since = t
            .status_start_time
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_default();
        w.write_record([
            t.queue_position.to_string().as_str(),
            t.id.to_string().as_str(),
            t.name.as_str(),
            t.status.as_str(),
            if t.is_active { "true" } else { "false" },
            since.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
