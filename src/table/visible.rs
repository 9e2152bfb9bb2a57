use serde::{Deserialize, Serialize};

use super::mask::{filter_columns, filter_rows};

/// `table[machine][slot]` is true when the machine is in use during the slot.
pub type OccupancyTable = Vec<Vec<bool>>;

/// The occupancy table restricted to the visible machines and slots, with matching labels.
///
/// Row `i` of `table` belongs to `machine_names[i]`, column `j` to `slot_names[j]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibleSchedule {
    pub table: OccupancyTable,
    pub machine_names: Vec<String>,
    pub slot_names: Vec<String>,
}

/// Apply the machine mask to rows and names, then the slot mask to columns and slot names.
pub fn get_visible_schedule(
    table: &[Vec<bool>],
    machine_names: &[String],
    slot_names: &[String],
    machine_mask: &[bool],
    slot_mask: &[bool],
) -> VisibleSchedule {
    let rows = filter_rows(table, machine_mask);
    VisibleSchedule {
        table: filter_columns(&rows, slot_mask),
        machine_names: filter_rows(machine_names, machine_mask),
        slot_names: filter_rows(slot_names, slot_mask),
    }
}
