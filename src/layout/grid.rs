//! Grid layout solver.
//!
//! A grid box is solved in four steps: outer margins are subtracted to get
//! the usable area, the usable width and height are split into column and
//! row tracks, gutters are carved out of adjacent cells, and the resulting
//! cells are returned in row-major order.
//!
//! Rounding is exact: the tracks of an axis always sum to the usable size
//! (unless no track is unspecified and the explicit tracks leave slack, in
//! which case the slack stays empty after the last track).

use std::cmp::Ordering;
use std::fmt;

use crate::expr::{Edges, ExpressionError, Gutter, SizeSpec};
use crate::geometry::{Region, Size};

/// Errors from solving a grid (or any other box split).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error(
        "outer margins ({horizontal}px horizontal, {vertical}px vertical) leave no usable area in a {width}x{height} box"
    )]
    MarginsOverflow {
        width: i32,
        height: i32,
        horizontal: i32,
        vertical: i32,
    },
    #[error("{property} is negative ({value}px)")]
    NegativeSpacing { property: &'static str, value: i32 },
    #[error("{track} tracks need {required}px but only {available}px are usable")]
    TracksOverflow {
        track: Track,
        required: i64,
        available: i32,
    },
    #[error("{track} {index} resolves to {size}px")]
    NonPositiveTrack { track: Track, index: usize, size: i32 },
    #[error("cell {index} in the {track} direction is {size}px after gutters")]
    NonPositiveCell { track: Track, index: usize, size: i32 },
    #[error("{property} resolves to a {width}x{height} box")]
    NonPositiveBox {
        property: &'static str,
        width: i32,
        height: i32,
    },
    #[error("{property} needs {required}px but the container has {available}px")]
    Oversized {
        property: &'static str,
        required: i32,
        available: i32,
    },
    #[error("{property}: {source}")]
    Within {
        property: &'static str,
        #[source]
        source: Box<LayoutError>,
    },
    #[error("{property}: {source}")]
    Expression {
        property: String,
        #[source]
        source: ExpressionError,
    },
}

impl LayoutError {
    /// The raw property that triggered the error.
    pub fn property(&self) -> String {
        match self {
            LayoutError::MarginsOverflow { .. } => "outer_margins".into(),
            LayoutError::NegativeSpacing { property, .. } => (*property).into(),
            LayoutError::TracksOverflow { track, .. }
            | LayoutError::NonPositiveTrack { track, .. } => track.sizes_key().into(),
            LayoutError::NonPositiveCell { .. } => "inner_margins".into(),
            LayoutError::NonPositiveBox { property, .. }
            | LayoutError::Oversized { property, .. }
            | LayoutError::Within { property, .. } => (*property).into(),
            LayoutError::Expression { property, .. } => property.clone(),
        }
    }
}

/// Direction of a set of tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    Row,
    Column,
}

impl Track {
    /// Configuration key holding this direction's size specs.
    pub fn sizes_key(self) -> &'static str {
        match self {
            Track::Row => "row_sizes",
            Track::Column => "column_sizes",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Row => write!(f, "row"),
            Track::Column => write!(f, "column"),
        }
    }
}

/// Most tracks a grid may declare in either direction.
///
/// Every track is at least one pixel, so no surface could fit more.
pub const MAX_TRACKS: usize = 1 << 16;

/// Layout properties of a grid container.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    pub rows: usize,
    pub columns: usize,
    /// One spec per row.
    pub row_sizes: Vec<SizeSpec>,
    /// One spec per column.
    pub column_sizes: Vec<SizeSpec>,
    pub outer_margins: Edges,
    pub inner_margins: Gutter,
}

/// A solved grid: usable area, track sizes and cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedGrid {
    /// Container box minus outer margins.
    pub usable: Region,
    /// Column widths before gutters are subtracted.
    pub columns: Vec<i32>,
    /// Row heights before gutters are subtracted.
    pub rows: Vec<i32>,
    /// Cells in row-major order, gutters subtracted.
    pub cells: Vec<Region>,
}

impl GridSpec {
    /// A grid with every track unspecified and no margins.
    ///
    /// Counts of zero are raised to one and counts above [`MAX_TRACKS`] are
    /// lowered to it. The loader rejects such counts before they get here.
    pub fn new(rows: usize, columns: usize) -> Self {
        let rows = rows.clamp(1, MAX_TRACKS);
        let columns = columns.clamp(1, MAX_TRACKS);
        Self {
            rows,
            columns,
            row_sizes: vec![SizeSpec::Auto; rows],
            column_sizes: vec![SizeSpec::Auto; columns],
            outer_margins: Edges::zero(),
            inner_margins: Gutter::zero(),
        }
    }

    /// Set row size specs (builder). Missing trailing specs are auto.
    pub fn with_row_sizes(mut self, sizes: Vec<SizeSpec>) -> Self {
        self.row_sizes = pad(sizes, self.rows);
        self
    }

    /// Set column size specs (builder). Missing trailing specs are auto.
    pub fn with_column_sizes(mut self, sizes: Vec<SizeSpec>) -> Self {
        self.column_sizes = pad(sizes, self.columns);
        self
    }

    /// Set outer margins (builder).
    pub fn with_outer_margins(mut self, margins: Edges) -> Self {
        self.outer_margins = margins;
        self
    }

    /// Set inner margins (builder).
    pub fn with_inner_margins(mut self, gutter: Gutter) -> Self {
        self.inner_margins = gutter;
        self
    }

    /// Number of cells.
    pub fn capacity(&self) -> usize {
        self.rows.saturating_mul(self.columns)
    }

    /// Solve the grid inside `container`.
    pub fn solve(&self, container: Region) -> Result<SolvedGrid, LayoutError> {
        let margins = self
            .outer_margins
            .resolve(container.size())
            .map_err(|source| LayoutError::Expression {
                property: "outer_margins".into(),
                source,
            })?;
        for value in [margins.top, margins.right, margins.bottom, margins.left] {
            if value < 0 {
                return Err(LayoutError::NegativeSpacing {
                    property: "outer_margins",
                    value,
                });
            }
        }

        let usable = container.inset(margins);
        if usable.is_empty() {
            return Err(LayoutError::MarginsOverflow {
                width: container.width,
                height: container.height,
                horizontal: margins.left.saturating_add(margins.right),
                vertical: margins.top.saturating_add(margins.bottom),
            });
        }

        let context = usable.size();
        let row_gutter = gutter_pixels(&self.inner_margins.row, context)?;
        let column_gutter = gutter_pixels(&self.inner_margins.column, context)?;

        let columns = distribute(usable.width, &self.column_sizes, context, Track::Column)?;
        let rows = distribute(usable.height, &self.row_sizes, context, Track::Row)?;

        let column_spans = carve(usable.x, &columns, column_gutter, Track::Column)?;
        let row_spans = carve(usable.y, &rows, row_gutter, Track::Row)?;

        let cells = row_spans
            .iter()
            .flat_map(|&(y, height)| {
                column_spans
                    .iter()
                    .map(move |&(x, width)| Region::new(x, y, width, height))
            })
            .collect();

        Ok(SolvedGrid {
            usable,
            columns,
            rows,
            cells,
        })
    }
}

fn pad(mut sizes: Vec<SizeSpec>, count: usize) -> Vec<SizeSpec> {
    sizes.resize(count, SizeSpec::Auto);
    sizes
}

fn gutter_pixels(spec: &SizeSpec, context: Size) -> Result<i32, LayoutError> {
    let value = spec
        .pixels_or_zero(context)
        .map_err(|source| LayoutError::Expression {
            property: "inner_margins".into(),
            source,
        })?;
    if value < 0 {
        return Err(LayoutError::NegativeSpacing {
            property: "inner_margins",
            value,
        });
    }
    Ok(value)
}

/// Split `total` pixels into one track per spec.
///
/// Explicit tracks are evaluated against `context` and rounded jointly by
/// largest remainder. Unspecified tracks share what is left: `R / k` each,
/// plus one pixel for each of the first `R % k`.
pub fn distribute(
    total: i32,
    specs: &[SizeSpec],
    context: Size,
    track: Track,
) -> Result<Vec<i32>, LayoutError> {
    let mut exact = Vec::new();
    let mut explicit_index = Vec::new();
    for (index, spec) in specs.iter().enumerate() {
        let value = spec.eval(context).map_err(|source| LayoutError::Expression {
            property: format!("{}[{index}]", track.sizes_key()),
            source,
        })?;
        if let Some(value) = value {
            if !value.is_finite() || value.abs() > f64::from(i32::MAX) {
                return Err(LayoutError::TracksOverflow {
                    track,
                    required: value as i64,
                    available: total,
                });
            }
            exact.push(value);
            explicit_index.push(index);
        }
    }

    let mut sizes = vec![0; specs.len()];
    for (&index, size) in explicit_index.iter().zip(round_jointly(&exact)) {
        sizes[index] = size;
    }
    if let Some(&index) = explicit_index.iter().find(|&&index| sizes[index] <= 0) {
        return Err(LayoutError::NonPositiveTrack {
            track,
            index,
            size: clamp_pixels(sizes[index]),
        });
    }

    let required: i64 = sizes.iter().sum();
    if required > i64::from(total) {
        return Err(LayoutError::TracksOverflow {
            track,
            required,
            available: total,
        });
    }

    let auto: Vec<usize> = specs
        .iter()
        .enumerate()
        .filter_map(|(index, spec)| spec.is_auto().then_some(index))
        .collect();
    if !auto.is_empty() {
        let remaining = i64::from(total) - required;
        let share = auto.len() as i64;
        let base = remaining / share;
        let extra = (remaining % share) as usize;
        for (position, &index) in auto.iter().enumerate() {
            sizes[index] = base + i64::from(position < extra);
        }
    }

    let mut tracks = Vec::with_capacity(sizes.len());
    for (index, size) in sizes.into_iter().enumerate() {
        if size <= 0 {
            return Err(LayoutError::NonPositiveTrack {
                track,
                index,
                size: clamp_pixels(size),
            });
        }
        tracks.push(i32::try_from(size).map_err(|_| LayoutError::TracksOverflow {
            track,
            required: size,
            available: total,
        })?);
    }
    Ok(tracks)
}

fn clamp_pixels(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Round `exact` so the result sums to the rounded total of `exact`.
///
/// Each value is floored, then the missing pixels go to the values with the
/// largest fractional parts. Ties go to the lower index.
fn round_jointly(exact: &[f64]) -> Vec<i64> {
    if exact.is_empty() {
        return Vec::new();
    }
    let target = exact.iter().sum::<f64>().round() as i64;
    let mut rounded: Vec<i64> = exact.iter().map(|v| v.floor() as i64).collect();
    let deficit = target - rounded.iter().sum::<i64>();

    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.partial_cmp(&fa).unwrap_or(Ordering::Equal).then(a.cmp(&b))
    });
    for &index in order.iter().cycle().take(deficit.max(0) as usize) {
        rounded[index] += 1;
    }
    rounded
}

/// Turn track sizes into `(start, length)` spans, taking `floor(g/2)` from
/// the cell before each gutter and `ceil(g/2)` from the cell after.
fn carve(
    origin: i32,
    tracks: &[i32],
    gutter: i32,
    track: Track,
) -> Result<Vec<(i32, i32)>, LayoutError> {
    let before = gutter / 2;
    let after = gutter - before;
    let last = tracks.len().saturating_sub(1);
    let mut spans = Vec::with_capacity(tracks.len());
    let mut offset = origin;
    for (index, &size) in tracks.iter().enumerate() {
        let lead = if index > 0 { after } else { 0 };
        let trail = if index < last { before } else { 0 };
        let length = size - lead - trail;
        if length <= 0 {
            return Err(LayoutError::NonPositiveCell {
                track,
                index,
                size: length,
            });
        }
        let overflow = move || LayoutError::TracksOverflow {
            track,
            required: i64::from(offset) + i64::from(size),
            available: i32::MAX,
        };
        let start = offset.checked_add(lead).ok_or_else(overflow)?;
        spans.push((start, length));
        offset = offset.checked_add(size).ok_or_else(overflow)?;
    }
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn specs(raw: &[&str]) -> Vec<SizeSpec> {
        raw.iter().map(|s| SizeSpec::parse(s).unwrap()).collect()
    }

    fn widths(grid: &SolvedGrid) -> Vec<i32> {
        grid.cells.iter().map(|c| c.width).collect()
    }

    #[test]
    fn expression_columns_are_exact() {
        let spec = GridSpec::new(1, 2).with_column_sizes(specs(&["w*0.4", "w*0.6"]));
        let grid = spec.solve(Region::new(0, 0, 100, 50)).unwrap();
        assert_eq!(widths(&grid), vec![40, 60]);
        assert_eq!(grid.cells[1].x, 40);
    }

    #[test]
    fn margins_wider_than_container_overflow() {
        let spec = GridSpec::new(1, 1).with_outer_margins(Edges::all(SizeSpec::Pixels(25)));
        let err = spec.solve(Region::new(0, 0, 40, 100)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::MarginsOverflow {
                width: 40,
                height: 100,
                horizontal: 50,
                vertical: 50,
            }
        );
        assert_eq!(err.property(), "outer_margins");
    }

    #[test]
    fn auto_tracks_share_remainder_front_loaded() {
        let spec = GridSpec::new(1, 3);
        let grid = spec.solve(Region::new(0, 0, 100, 10)).unwrap();
        assert_eq!(grid.columns, vec![34, 33, 33]);
        assert_eq!(widths(&grid), vec![34, 33, 33]);
    }

    #[test]
    fn explicit_tracks_round_by_largest_remainder() {
        let spec = GridSpec::new(1, 3).with_column_sizes(specs(&["w/3", "w/3", "w/3"]));
        let grid = spec.solve(Region::new(0, 0, 100, 10)).unwrap();
        // 33.33 each: the total rounds to 100, the extra pixel goes to index 0.
        assert_eq!(grid.columns, vec![34, 33, 33]);
    }

    #[test]
    fn mixed_explicit_and_auto() {
        let spec = GridSpec::new(1, 3).with_column_sizes(specs(&["20", "?", "w*0.3"]));
        let grid = spec.solve(Region::new(10, 0, 200, 10)).unwrap();
        assert_eq!(grid.columns, vec![20, 120, 60]);
        assert_eq!(grid.cells[2].x, 150);
    }

    #[test]
    fn slack_stays_after_last_track() {
        let spec = GridSpec::new(1, 2).with_column_sizes(specs(&["30", "30"]));
        let grid = spec.solve(Region::new(0, 0, 100, 10)).unwrap();
        assert_eq!(grid.columns, vec![30, 30]);
        assert_eq!(grid.cells[1].right(), 60);
    }

    #[test]
    fn explicit_tracks_exceeding_usable_size_overflow() {
        let spec = GridSpec::new(2, 1).with_row_sizes(specs(&["60", "h*0.5"]));
        let err = spec.solve(Region::new(0, 0, 10, 100)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::TracksOverflow {
                track: Track::Row,
                required: 110,
                available: 100,
            }
        );
    }

    #[test]
    fn auto_track_with_nothing_left_is_non_positive() {
        let spec = GridSpec::new(1, 2).with_column_sizes(specs(&["w", "?"]));
        let err = spec.solve(Region::new(0, 0, 100, 10)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::NonPositiveTrack {
                track: Track::Column,
                index: 1,
                size: 0,
            }
        );
    }

    #[test]
    fn expressions_see_usable_area() {
        let spec = GridSpec::new(1, 2)
            .with_outer_margins(Edges::all(SizeSpec::Pixels(10)))
            .with_column_sizes(specs(&["w*0.5"]));
        let grid = spec.solve(Region::new(0, 0, 120, 40)).unwrap();
        assert_eq!(grid.usable, Region::new(10, 10, 100, 20));
        assert_eq!(grid.columns, vec![50, 50]);
    }

    #[test]
    fn odd_gutter_splits_floor_before_ceil_after() {
        let spec = GridSpec::new(1, 3).with_inner_margins(Gutter {
            row: SizeSpec::Pixels(0),
            column: SizeSpec::Pixels(5),
        });
        let grid = spec.solve(Region::new(0, 0, 90, 10)).unwrap();
        assert_eq!(
            grid.cells,
            vec![
                Region::new(0, 0, 28, 10),
                Region::new(33, 0, 25, 10),
                Region::new(63, 0, 27, 10),
            ]
        );
        let used: i32 = widths(&grid).iter().sum::<i32>() + 2 * 5;
        assert_eq!(used, 90);
    }

    #[test]
    fn gutter_eating_a_cell_fails() {
        let spec = GridSpec::new(2, 1).with_inner_margins(Gutter {
            row: SizeSpec::Pixels(12),
            column: SizeSpec::Pixels(0),
        });
        let err = spec.solve(Region::new(0, 0, 10, 12)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::NonPositiveCell {
                track: Track::Row,
                index: 0,
                size: 0,
            }
        );
    }

    #[test]
    fn cells_are_row_major() {
        let grid = GridSpec::new(2, 2).solve(Region::new(0, 0, 20, 20)).unwrap();
        assert_eq!(
            grid.cells,
            vec![
                Region::new(0, 0, 10, 10),
                Region::new(10, 0, 10, 10),
                Region::new(0, 10, 10, 10),
                Region::new(10, 10, 10, 10),
            ]
        );
    }

    #[test]
    fn tracks_plus_gutters_plus_margins_fill_container() {
        let margins = Edges::from_value(&serde_yaml::from_str("[7, 3]").unwrap()).unwrap();
        let spec = GridSpec::new(3, 4)
            .with_outer_margins(margins)
            .with_inner_margins(Gutter {
                row: SizeSpec::Pixels(3),
                column: SizeSpec::Pixels(4),
            })
            .with_column_sizes(specs(&["w*0.17", "?", "w*0.33"]));
        for (width, height) in [(101, 77), (333, 211), (640, 480)] {
            let container = Region::new(0, 0, width, height);
            let grid = spec.solve(container).unwrap();
            let columns: i32 = grid.cells[..4].iter().map(|c| c.width).sum();
            let rows: i32 = grid.cells.iter().step_by(4).map(|c| c.height).sum();
            assert_eq!(columns + 3 * 4 + 6, width);
            assert_eq!(rows + 2 * 3 + 14, height);
            assert!(grid.cells.iter().all(|c| container.contains_region(*c)));
        }
    }

    #[test]
    fn division_by_zero_names_track() {
        let spec = GridSpec::new(1, 1).with_column_sizes(specs(&["w/(h-h)"]));
        let err = spec.solve(Region::new(0, 0, 10, 10)).unwrap_err();
        assert_eq!(err.property(), "column_sizes[0]");
        assert!(matches!(err, LayoutError::Expression { .. }));
    }

    #[test]
    fn zero_counts_are_raised() {
        let spec = GridSpec::new(0, 0);
        assert_eq!(spec.capacity(), 1);
    }

    #[test]
    fn huge_margins_overflow_instead_of_wrapping() {
        let spec =
            GridSpec::new(1, 1).with_outer_margins(Edges::all(SizeSpec::Pixels(2_000_000_000)));
        let err = spec.solve(Region::new(0, 0, 100, 100)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::MarginsOverflow {
                width: 100,
                height: 100,
                horizontal: i32::MAX,
                vertical: i32::MAX,
            }
        );
    }

    #[test]
    fn huge_track_sum_overflows() {
        let spec = GridSpec::new(2, 1).with_row_sizes(specs(&["2000000000", "2000000000"]));
        let err = spec.solve(Region::new(0, 0, 100, 100)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::TracksOverflow {
                track: Track::Row,
                required: 4_000_000_000,
                available: 100,
            }
        );
    }

    #[test]
    fn track_beyond_pixel_range_is_not_truncated() {
        let spec = GridSpec::new(1, 2).with_column_sizes(specs(&["4294967346", "?"]));
        let err = spec.solve(Region::new(0, 0, 100, 10)).unwrap_err();
        assert_eq!(err.property(), "column_sizes");
        assert!(matches!(
            err,
            LayoutError::TracksOverflow { track: Track::Column, required: 4_294_967_346, .. }
        ));
    }

    #[test]
    fn track_counts_are_bounded() {
        let spec = GridSpec::new(usize::MAX, usize::MAX);
        assert_eq!(spec.rows, MAX_TRACKS);
        assert_eq!(spec.row_sizes.len(), MAX_TRACKS);
        assert_eq!(spec.capacity(), MAX_TRACKS * MAX_TRACKS);
    }

    #[test]
    fn round_jointly_preserves_total() {
        assert_eq!(round_jointly(&[28.999999, 71.000001]), vec![29, 71]);
        assert_eq!(round_jointly(&[0.5, 0.5, 0.5]), vec![1, 1, 0]);
        assert!(round_jointly(&[]).is_empty());
    }
}
