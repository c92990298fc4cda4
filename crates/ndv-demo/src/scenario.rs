//! The scripted walkthrough printed by the demo binary.
//!
//! Output lines, in order:
//!
//! 1. the LUT that channel `6` resolves to after a green default is set;
//! 2. `channel_axis: 4`;
//! 3. `current_index[5] = 1` for the label key `"5"`;
//! 4. `current_index[5] = 4` for the integer key `5`, a second add.

use ndv_model::{ArrayDisplayModel, AxisKey, CoordIndex, IndexValue, LutModel, ModelError};

/// Run the scenario, handing each output line to `emit`.
///
/// Listeners are connected for the model's whole life, so later edits to
/// the returned model keep reporting through `emit`.
pub fn run_scenario(
    emit: impl Fn(String) + Clone + 'static,
) -> Result<ArrayDisplayModel, ModelError> {
    let model = ArrayDisplayModel::new();

    model.luts.set_default(LutModel::try_from("green")?)?;
    emit(model.luts.get(&Some(CoordIndex::from(6)))?.to_string());

    let out = emit.clone();
    model.channel_axis.connect(move |axis| {
        let shown = axis
            .as_ref()
            .map_or_else(|| "None".to_string(), ToString::to_string);
        out(format!("channel_axis: {shown}"));
    });
    let out = emit.clone();
    model
        .current_index
        .item_added()
        .connect(move |e| out(format!("current_index[{}] = {}", e.key, e.value)));
    let out = emit;
    model.current_index.item_changed().connect(move |e| {
        out(format!(
            "current_index[{}] = {} -> {}",
            e.key.repr(),
            e.old,
            e.new
        ));
    });

    model.channel_axis.set(Some(AxisKey::from(4)));
    model
        .current_index
        .set(AxisKey::from("5"), IndexValue::from(1))?;
    model
        .current_index
        .set(AxisKey::from(5), IndexValue::from(4))?;

    tracing::debug!(
        entries = model.current_index.len(),
        "scenario finished"
    );
    Ok(model)
}
