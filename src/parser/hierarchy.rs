//! Region hierarchy reconstruction.
//!
//! [`HierarchyBuilder`] turns a flat list of classified records into a
//! [`Page`] in three ordered passes:
//!
//! 1. Every top-level text region is attached to the page in input order.
//! 2. Every nestable region is attached to the top-level region that
//!    contains the largest share of it, provided that share is strictly
//!    greater than the region threshold. Otherwise it is promoted to the
//!    page.
//! 3. Every line is assigned to the smallest text region (at any depth)
//!    that covers strictly more than the overlap fraction of the line's
//!    area. Lines without such a region each get a freshly created
//!    container.
//!
//! Ties are broken by enumeration order: the first candidate reaching the
//! best score wins. Candidates are enumerated in creation order, i.e.
//! top-level regions first, then nestable regions in input order.
//!
//! Within passes 2 and 3 the candidate search for each record only reads
//! the page, so it can run in parallel. Results are applied in input order
//! afterwards, which keeps placement and ids deterministic.

use rayon::prelude::*;

use crate::model::{
    containment_ratio, intersection_area, ImageInfo, OpaqueRegion, Page, Polygon, Record,
    RegionId, RegionNode, RegionOrigin, Role,
};

use super::observer::{LayoutEvent, LayoutObserver, Pass};
use super::options::LayoutOptions;

/// Id prefix of containers created for unplaced lines.
pub const ORPHAN_REGION_PREFIX: &str = "r_orphan";

/// Outcome of the parent search for a nestable region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentMatch {
    /// Chosen parent, `None` when no candidate beat the threshold
    pub parent: Option<RegionId>,
    /// Best containment ratio among all candidates
    pub ratio: f64,
}

/// Outcome of the container search for a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerMatch {
    /// Chosen container
    pub region: RegionId,
    /// Share of the line's area the container covers
    pub coverage: f64,
}

/// Builds the region hierarchy for one page.
#[derive(Debug, Clone, Default)]
pub struct HierarchyBuilder {
    options: LayoutOptions,
}

impl HierarchyBuilder {
    /// Create a builder.
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Place all records on a new page.
    ///
    /// Never fails: degenerate geometry scores zero and unplaceable records
    /// fall back to the page level.
    pub fn build(
        &self,
        image: ImageInfo,
        records: Vec<Record>,
        observer: &mut dyn LayoutObserver,
    ) -> Page {
        let mut page = Page::new(image);
        let mut top_regions = Vec::new();
        let mut nestable = Vec::new();
        let mut leaves = Vec::new();

        for record in records {
            match record.role {
                Role::Opaque(kind) => page.add_opaque(OpaqueRegion {
                    id: record.id,
                    kind,
                    polygon: record.polygon,
                    class_id: record.class_id,
                }),
                Role::TopRegion => top_regions.push(record),
                Role::NestableRegion => nestable.push(record),
                Role::Leaf => leaves.push(record),
            }
        }

        let parents = self.place_top_regions(&mut page, top_regions, observer);
        self.place_nestable_regions(&mut page, &parents, nestable, observer);
        self.place_lines(&mut page, leaves, observer);

        observer.on_event(&LayoutEvent::Finished {
            stats: page.stats(),
        });
        page
    }

    fn place_top_regions(
        &self,
        page: &mut Page,
        records: Vec<Record>,
        observer: &mut dyn LayoutObserver,
    ) -> Vec<RegionId> {
        observer.on_event(&LayoutEvent::PassStarted {
            pass: Pass::TopRegions,
            count: records.len(),
        });
        records
            .into_iter()
            .map(|r| page.add_top_region(region_node(r, RegionOrigin::Declared)))
            .collect()
    }

    fn place_nestable_regions(
        &self,
        page: &mut Page,
        parents: &[RegionId],
        records: Vec<Record>,
        observer: &mut dyn LayoutObserver,
    ) {
        observer.on_event(&LayoutEvent::PassStarted {
            pass: Pass::NestedRegions,
            count: records.len(),
        });

        let threshold = self.options.region_threshold;
        let matches = {
            let page = &*page;
            self.search(&records, |r| {
                best_parent(page, parents, &r.polygon, threshold)
            })
        };

        for (record, found) in records.into_iter().zip(matches) {
            match found.parent {
                Some(parent) => {
                    let event = LayoutEvent::RegionNested {
                        id: record.id.clone(),
                        parent: page[parent].id.clone(),
                        ratio: found.ratio,
                    };
                    page.add_child_region(parent, region_node(record, RegionOrigin::Nested));
                    observer.on_event(&event);
                }
                None => {
                    let event = LayoutEvent::RegionPromoted {
                        id: record.id.clone(),
                        best_ratio: found.ratio,
                    };
                    page.add_top_region(region_node(record, RegionOrigin::Promoted));
                    observer.on_event(&event);
                }
            }
        }
    }

    fn place_lines(&self, page: &mut Page, records: Vec<Record>, observer: &mut dyn LayoutObserver) {
        observer.on_event(&LayoutEvent::PassStarted {
            pass: Pass::Lines,
            count: records.len(),
        });

        let fraction = self.options.line_overlap_fraction;
        let matches = {
            let page = &*page;
            let candidates: Vec<RegionId> = page.regions().map(|(id, _)| id).collect();
            self.search(&records, |r| {
                best_container(page, &candidates, &r.polygon, fraction)
            })
        };

        let mut orphan_count = 0usize;
        for (record, found) in records.into_iter().zip(matches) {
            match found {
                Some(found) => {
                    let event = LayoutEvent::LinePlaced {
                        id: record.id.clone(),
                        region: page[found.region].id.clone(),
                        coverage: found.coverage,
                    };
                    page.add_line(found.region, record.id, record.polygon, record.class_id);
                    observer.on_event(&event);
                }
                None => {
                    let container_id = format!("{}{:04}", ORPHAN_REGION_PREFIX, orphan_count);
                    orphan_count += 1;
                    let subtype = record
                        .subtype
                        .clone()
                        .unwrap_or_else(|| self.options.default_container_type.clone());
                    let container = page.add_top_region(RegionNode::new(
                        container_id.clone(),
                        record.polygon.clone(),
                        Some(subtype),
                        None,
                        RegionOrigin::Manufactured,
                    ));
                    let event = LayoutEvent::LineOrphaned {
                        id: record.id.clone(),
                        container: container_id,
                    };
                    page.add_line(container, record.id, record.polygon, record.class_id);
                    observer.on_event(&event);
                }
            }
        }
    }

    /// Run `f` over `records`, in parallel when enabled. Output order always
    /// matches input order.
    fn search<T, F>(&self, records: &[Record], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Record) -> T + Sync + Send,
    {
        if self.options.parallel && records.len() > 1 {
            records.par_iter().map(f).collect()
        } else {
            records.iter().map(f).collect()
        }
    }
}

fn region_node(record: Record, origin: RegionOrigin) -> RegionNode {
    RegionNode::new(
        record.id,
        record.polygon,
        record.subtype,
        Some(record.class_id),
        origin,
    )
}

/// Find the candidate containing the largest share of `child`.
///
/// Only a ratio strictly greater than `threshold` selects a parent; among
/// equal best ratios the first candidate wins.
pub fn best_parent(
    page: &Page,
    candidates: &[RegionId],
    child: &Polygon,
    threshold: f64,
) -> ParentMatch {
    let mut parent = None;
    let mut best_score = threshold;
    let mut best_ratio = 0.0_f64;
    for &candidate in candidates {
        let ratio = containment_ratio(child, &page[candidate].polygon);
        best_ratio = best_ratio.max(ratio);
        if ratio > best_score {
            best_score = ratio;
            parent = Some(candidate);
        }
    }
    ParentMatch {
        parent,
        ratio: best_ratio,
    }
}

/// Find the smallest candidate covering more than `fraction` of `line`.
///
/// Returns `None` for a line with no area. Among candidates of equal area
/// the first wins.
pub fn best_container(
    page: &Page,
    candidates: &[RegionId],
    line: &Polygon,
    fraction: f64,
) -> Option<ContainerMatch> {
    let line_area = line.area();
    if line_area <= 0.0 {
        return None;
    }
    let min_overlap = line_area * fraction;

    let mut best: Option<(ContainerMatch, f64)> = None;
    for &candidate in candidates {
        let region = &page[candidate].polygon;
        let overlap = intersection_area(line, region);
        if overlap <= min_overlap {
            continue;
        }
        let area = region.area();
        if best.map_or(true, |(_, best_area)| area < best_area) {
            best = Some((
                ContainerMatch {
                    region: candidate,
                    coverage: overlap / line_area,
                },
                area,
            ));
        }
    }
    best.map(|(found, _)| found)
}
