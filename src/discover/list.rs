//! Explicit-file-list strategy: literal filenames supplied by the caller.

use std::collections::VecDeque;

use crate::error::{AcquireError, Result};
use crate::model::{Cursor, ObservationId};

use super::{Context, Step};

/// Deliver the next filename from the list.
///
/// Relative entries resolve against the input root. A blank or
/// whitespace-only entry terminates the list early, the same as running
/// out. Entries are only popped on delivery.
///
/// List entries carry no observation number of their own: the number is
/// parsed from the basename when it follows the naming convention, and the
/// cursor's running counter covers everything else, never moving backward.
pub(super) fn poll(
    queue: &mut VecDeque<String>,
    ctx: &Context<'_>,
    cursor: &mut Cursor,
) -> Result<Step> {
    let Some(counter) = cursor.next else {
        return Ok(Step::Done);
    };

    let Some(entry) = queue.front() else {
        cursor.finish();
        return Ok(Step::Done);
    };
    if entry.trim().is_empty() {
        cursor.finish();
        return Ok(Step::Done);
    }

    let path = ctx.layout.resolve_entry(entry.trim());
    if !path.is_file() {
        return Err(AcquireError::NotFound { path });
    }

    let ut = ObservationId::new(ctx.ut_date, 0).ut_compact();
    let number = path
        .file_name()
        .and_then(|name| ctx.layout.parse_number(&name.to_string_lossy(), &ut))
        .filter(|&parsed| parsed >= counter)
        .unwrap_or(counter);

    queue.pop_front();
    cursor.advance_to(number + 1);
    Ok(Step::Ready {
        observation: ObservationId::new(ctx.ut_date, number),
        files: vec![path],
    })
}
