//! Sensor readings from one poll cycle.

use tabled::Tabled;

use zyxly_core::{Coordinator, CoreError, RouterConfig, SensorReading, read_sensors};

use crate::cli::{GlobalOpts, SensorsArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Sensor")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Key")]
    key: &'static str,
}

fn row(r: &SensorReading) -> SensorRow {
    SensorRow {
        name: r.name,
        value: output::format_reading(r),
        key: r.key,
    }
}

/// Drop sensors that are off by default unless `all` is set.
pub(crate) fn select(readings: Vec<SensorReading>, all: bool) -> Vec<SensorReading> {
    readings
        .into_iter()
        .filter(|r| all || r.enabled_by_default)
        .collect()
}

pub(crate) fn render(readings: &[SensorReading], global: &GlobalOpts) -> Result<String, CliError> {
    output::render_list(&global.output, readings, row, output::plain_reading)
}

pub async fn handle(
    config: RouterConfig,
    args: &SensorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let readings = Coordinator::oneshot(config, |c| async move {
        c.snapshot()
            .map(|snapshot| read_sensors(&snapshot))
            .ok_or_else(|| CoreError::Internal("no snapshot after refresh".into()))
    })
    .await?;

    let out = render(&select(readings, args.all), global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
