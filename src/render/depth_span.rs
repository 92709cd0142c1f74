//! Depth-buffer span partitioning and coalescing (spec §4.3).

use crate::config::EngineConfig;

use super::types::{DepthBufferSpan, VisibleItem};

/// Splits, coalesces, and extends the visible-item list into the ordered,
/// far-first list of depth spans the [`super::span_renderer::SpanRenderer`]
/// iterates.
#[derive(Debug, Default)]
pub struct DepthSpanPartitioner;

impl DepthSpanPartitioner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs the full split → coalesce → splittable-extension pipeline.
    ///
    /// `normal_items` must be sorted ascending by `far_distance` (as
    /// produced by [`super::visible_items::VisibleItemCollector`]).
    /// `splittable_items` likewise.
    pub fn partition(
        &self,
        normal_items: &[VisibleItem],
        splittable_items: &[VisibleItem],
        projection_near: f64,
        projection_far: f64,
        config: &EngineConfig,
    ) -> Vec<DepthBufferSpan> {
        let split = Self::split_phase(normal_items);
        let merged = Self::coalesce_phase(&split, config.preferred_near_far_ratio);
        Self::extend_for_splittable(
            merged,
            splittable_items,
            projection_near,
            projection_far,
            config.max_far_near_ratio,
        )
    }

    /// Split phase: walk items back to front (descending `far_distance`),
    /// producing disjoint spans, with empty spans inserted to keep
    /// adjacency where items leave gaps.
    fn split_phase(normal_items: &[VisibleItem]) -> Vec<DepthBufferSpan> {
        let mut spans: Vec<DepthBufferSpan> = Vec::new();

        for item_index in (0..normal_items.len()).rev() {
            let item = &normal_items[item_index];
            let item_near = f64::from(item.near_distance);
            let item_far = f64::from(item.far_distance);

            let current_near = spans.last().map(|s| s.near_distance);

            match current_near {
                None => spans.push(DepthBufferSpan {
                    near_distance: item_near,
                    far_distance: item_far,
                    back_item_index: item_index,
                    item_count: 1,
                }),
                Some(current_near) if item_far < current_near => {
                    spans.push(DepthBufferSpan {
                        near_distance: item_far,
                        far_distance: current_near,
                        back_item_index: item_index,
                        item_count: 0,
                    });
                    spans.push(DepthBufferSpan {
                        near_distance: item_near,
                        far_distance: item_far,
                        back_item_index: item_index,
                        item_count: 1,
                    });
                }
                Some(current_near) => {
                    let last = spans.last_mut().unwrap();
                    last.item_count += 1;
                    last.near_distance = current_near.min(item_near);
                }
            }
        }

        spans
    }

    /// Coalesce phase: merge adjacent spans while the preferred near/far
    /// ratio guard permits it.
    fn coalesce_phase(split: &[DepthBufferSpan], preferred_ratio: f64) -> Vec<DepthBufferSpan> {
        let mut merged = Vec::new();
        let mut i = 0;

        while i < split.len() {
            let mut j = i;
            while j + 1 < split.len()
                && split[i].far_distance > 0.0
                && split[j + 1].near_distance / split[i].far_distance >= preferred_ratio
            {
                j += 1;
            }

            let item_count = split[i..=j].iter().map(|s| s.item_count).sum();
            merged.push(DepthBufferSpan {
                near_distance: split[j].near_distance,
                far_distance: split[i].far_distance,
                back_item_index: split[i].back_item_index,
                item_count,
            });

            i = j + 1;
        }

        merged
    }

    /// Splittable-item span extension (spec §4.3, final subsection). The
    /// prepend-back / append-front ordering here must match the spec
    /// exactly — reordering it breaks coverage of the projection range.
    fn extend_for_splittable(
        mut merged: Vec<DepthBufferSpan>,
        splittable_items: &[VisibleItem],
        projection_near: f64,
        projection_far: f64,
        max_far_near_ratio: f64,
    ) -> Vec<DepthBufferSpan> {
        if splittable_items.is_empty() {
            return merged;
        }

        if merged.is_empty() {
            let far = projection_far;
            let near = projection_near.max(far / max_far_near_ratio);
            merged.push(DepthBufferSpan {
                near_distance: near,
                far_distance: far,
                back_item_index: 0,
                item_count: 0,
            });
            return merged;
        }

        let splittable_front_far = f64::from(splittable_items[0].far_distance);
        let bound = splittable_front_far.min(projection_far);
        if bound > merged[0].far_distance {
            merged.insert(
                0,
                DepthBufferSpan {
                    near_distance: merged[0].far_distance,
                    far_distance: bound,
                    back_item_index: merged[0].back_item_index,
                    item_count: 0,
                },
            );
        }

        while merged.last().map(|s| s.near_distance) > Some(projection_near) {
            let current_front_near = merged.last().unwrap().near_distance;
            let bound = projection_near.max(current_front_near / max_far_near_ratio);
            if bound >= current_front_near {
                break;
            }
            merged.push(DepthBufferSpan {
                near_distance: bound,
                far_distance: current_front_near,
                back_item_index: merged.last().unwrap().back_item_index,
                item_count: 0,
            });
        }

        let back_far = merged[0].far_distance;
        merged.insert(
            0,
            DepthBufferSpan {
                near_distance: back_far,
                far_distance: back_far * max_far_near_ratio,
                back_item_index: merged[0].back_item_index,
                item_count: 0,
            },
        );

        merged
    }
}
