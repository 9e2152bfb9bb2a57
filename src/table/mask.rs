use tracing::debug;

/**
Keep the items whose flag in `mask` is set.

The mask must be the same length as `items`. If not, `items` is returned as is, so a stale
mask (e.g. a machine was added but the mask not yet updated) shows everything instead of
hiding the whole table.
*/
pub fn filter_rows<T: Clone>(items: &[T], mask: &[bool]) -> Vec<T> {
    if items.len() != mask.len() {
        debug!(
            "Row mask has {} entries for {} rows, not filtering",
            mask.len(),
            items.len()
        );
        return items.to_vec();
    }
    items
        .iter()
        .zip(mask)
        .filter(|(_, visible)| **visible)
        .map(|(item, _)| item.clone())
        .collect()
}

/**
Keep the columns whose flag in `mask` is set, in every row.

The column count is taken from the first row. If it differs from the mask length, or there
are no rows, `rows` is returned as is.
*/
pub fn filter_columns<T: Clone>(rows: &[Vec<T>], mask: &[bool]) -> Vec<Vec<T>> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    if first.len() != mask.len() {
        debug!(
            "Column mask has {} entries for {} columns, not filtering",
            mask.len(),
            first.len()
        );
        return rows.to_vec();
    }
    rows.iter().map(|row| filter_row_columns(row, mask)).collect()
}

fn filter_row_columns<T: Clone>(row: &[T], mask: &[bool]) -> Vec<T> {
    row.iter()
        .zip(mask)
        .filter(|(_, visible)| **visible)
        .map(|(cell, _)| cell.clone())
        .collect()
}
