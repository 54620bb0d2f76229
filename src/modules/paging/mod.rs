/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use core::fmt;
use core::str::FromStr;
use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::error::SimError;
use crate::process::{Pid, ProcessTable};

/// Frame replacement policy used when no free frame is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// Evict the globally oldest-allocated frame, regardless of who owns
    /// it right now.
    Fifo,
    /// Evict the frame with the smallest last-access stamp, lowest frame
    /// index on ties.
    Lru,
}

impl FromStr for ReplacementPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fifo" | "FIFO" => Ok(ReplacementPolicy::Fifo),
            "lru" | "LRU" => Ok(ReplacementPolicy::Lru),
            _ => Err(SimError::InvalidConfig("replacement policy must be FIFO or LRU")),
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReplacementPolicy::Fifo => "FIFO",
            ReplacementPolicy::Lru => "LRU",
        })
    }
}

/// One physical frame slot. The slot index is the frame's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFrame {
    /// `(pid, page_number)` of the page held here, if occupied.
    pub owner: Option<(Pid, usize)>,
    /// Logical stamp of the latest bind or access.
    pub last_access: u64,
}

/// Fixed-size frame table with pluggable eviction.
///
/// Frames are created once and only ever reassigned. A single strictly
/// increasing counter stamps every bind and access; it is the recency
/// clock, not simulated time.
#[derive(Debug)]
pub struct PageManager {
    frames: Vec<PageFrame>,
    /// Frames currently occupied, in allocation order. Head is the FIFO
    /// eviction victim.
    allocation_order: VecDeque<usize>,
    access_counter: u64,
}

impl PageManager {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frames: vec![
                PageFrame {
                    owner: None,
                    last_access: 0,
                };
                frame_count
            ],
            allocation_order: VecDeque::with_capacity(frame_count),
            access_counter: 0,
        }
    }

    /// Binds frames for every page of `pid`, evicting per `policy` when
    /// none is free. Pages beyond the total frame capacity stay unbound.
    /// Returns whether all requested pages ended up bound.
    pub fn allocate_pages(
        &mut self,
        table: &mut ProcessTable,
        pid: Pid,
        policy: ReplacementPolicy,
    ) -> Result<bool, SimError> {
        let index = table
            .index_of(pid)
            .ok_or_else(|| SimError::InvariantViolation(format!("unknown pid {}", pid)))?;
        let pages_needed = table.get(index).pages_needed;

        for page in 0..pages_needed {
            if page >= self.frames.len() {
                // requesting more pages than frames exist can never be
                // satisfied; leave the tail unbound
                warn!("P{} needs {} pages but only {} frames exist", pid, pages_needed, self.frames.len());
                break;
            }

            let frame = match self.find_free_frame() {
                Some(frame) => frame,
                None => self.evict(table, policy)?,
            };

            self.access_counter += 1;
            self.frames[frame] = PageFrame {
                owner: Some((pid, page)),
                last_access: self.access_counter,
            };
            self.allocation_order.push_back(frame);
            table.get_mut(index).page_table[page] = Some(frame);
            trace!("bound page {} of P{} to frame {}", page, pid, frame);
        }

        self.check_invariants(table)?;
        let bound = table.get(index).page_table.iter().filter(|f| f.is_some()).count();
        Ok(bound == pages_needed)
    }

    /// Refreshes the recency stamp of an occupied frame.
    pub fn access_page(&mut self, frame: usize) {
        if let Some(entry) = self.frames.get_mut(frame) {
            self.access_counter += 1;
            entry.last_access = self.access_counter;
        }
    }

    /// Frees every frame `pid` holds and clears its page table.
    pub fn deallocate_pages(&mut self, table: &mut ProcessTable, pid: Pid) -> Result<(), SimError> {
        let index = table
            .index_of(pid)
            .ok_or_else(|| SimError::InvariantViolation(format!("unknown pid {}", pid)))?;

        for slot in table.get_mut(index).page_table.iter_mut() {
            if let Some(frame) = slot.take() {
                self.frames[frame] = PageFrame {
                    owner: None,
                    last_access: 0,
                };
            }
        }
        let frames = &self.frames;
        self.allocation_order
            .retain(|&frame| frames[frame].owner.is_some());

        debug!("released all frames of P{}", pid);
        self.check_invariants(table)
    }

    /// Snapshot for the presentation layer.
    pub fn frames(&self) -> &[PageFrame] {
        &self.frames
    }

    fn find_free_frame(&self) -> Option<usize> {
        self.frames.iter().position(|f| f.owner.is_none())
    }

    /// Picks a victim frame, unbinds it from its current owner and
    /// returns it. A FIFO victim may well belong to the process that is
    /// allocating right now; that is allowed mid-burst.
    fn evict(&mut self, table: &mut ProcessTable, policy: ReplacementPolicy) -> Result<usize, SimError> {
        let victim = match policy {
            ReplacementPolicy::Fifo => self.allocation_order.pop_front().ok_or_else(|| {
                SimError::InvariantViolation("no free frame and empty allocation order".into())
            })?,
            ReplacementPolicy::Lru => {
                let victim = self
                    .frames
                    .iter()
                    .enumerate()
                    .min_by_key(|(index, frame)| (frame.last_access, *index))
                    .map(|(index, _)| index)
                    .ok_or_else(|| SimError::InvariantViolation("frame table is empty".into()))?;
                self.allocation_order.retain(|&f| f != victim);
                victim
            }
        };

        let (old_pid, old_page) = self.frames[victim].owner.ok_or_else(|| {
            SimError::InvariantViolation(format!("eviction picked free frame {}", victim))
        })?;

        // keep the frame/page-table agreement: the evicted owner loses
        // this page-table entry
        if let Some(owner_index) = table.index_of(old_pid) {
            table.get_mut(owner_index).page_table[old_page] = None;
        }
        self.frames[victim].owner = None;
        debug!("evicted page {} of P{} from frame {}", old_page, old_pid, victim);
        Ok(victim)
    }

    fn check_invariants(&self, table: &ProcessTable) -> Result<(), SimError> {
        for (index, frame) in self.frames.iter().enumerate() {
            if let Some((pid, page)) = frame.owner {
                let owner = table
                    .index_of(pid)
                    .map(|i| table.get(i))
                    .ok_or_else(|| {
                        SimError::InvariantViolation(format!("frame {} owned by unknown P{}", index, pid))
                    })?;
                if owner.page_table.get(page).copied().flatten() != Some(index) {
                    return Err(SimError::InvariantViolation(format!(
                        "frame {} claims page {} of P{} but the page table disagrees",
                        index, page, pid
                    )));
                }
            }
        }
        for process in table.iter() {
            for (page, slot) in process.page_table.iter().enumerate() {
                if let Some(frame) = *slot {
                    if self.frames.get(frame).and_then(|f| f.owner) != Some((process.pid, page)) {
                        return Err(SimError::InvariantViolation(format!(
                            "page {} of P{} points at frame {} which disagrees",
                            page, process.pid, frame
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::ProcessRecord;

    /// Page counts follow from the derived sizes at page size 64:
    /// pid 1 -> 2 pages, pid 5 -> 3 pages, pid 10 -> 4 pages.
    fn table(pids: &[Pid]) -> ProcessTable {
        let records: Vec<ProcessRecord> = pids
            .iter()
            .map(|&pid| ProcessRecord {
                pid,
                arrival_time: 0,
                burst_time: 5,
                priority: 0,
            })
            .collect();
        ProcessTable::new(&records, 64)
    }

    #[test]
    fn test_free_frames_preferred_over_eviction() {
        let mut table = table(&[1, 5]);
        let mut pager = PageManager::new(8);

        assert!(pager.allocate_pages(&mut table, 1, ReplacementPolicy::Fifo).unwrap());
        assert!(pager.allocate_pages(&mut table, 5, ReplacementPolicy::Fifo).unwrap());
        // 2 + 3 pages into 8 frames: nothing evicted
        assert_eq!(table.get(0).page_table, vec![Some(0), Some(1)]);
        assert_eq!(table.get(1).page_table, vec![Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_fifo_evicts_oldest_allocation_and_clears_owner() {
        // pid 10 -> 250 bytes -> 4 pages; pid 5 -> 3 pages; 4 frames total
        let mut table = table(&[10, 5]);
        let mut pager = PageManager::new(4);

        assert!(pager.allocate_pages(&mut table, 10, ReplacementPolicy::Fifo).unwrap());
        // all frames taken; P5 forces eviction of P10's oldest frames 0..2
        assert!(pager.allocate_pages(&mut table, 5, ReplacementPolicy::Fifo).unwrap());

        assert_eq!(table.get(1).page_table, vec![Some(0), Some(1), Some(2)]);
        // the evicted owner's entries are unbound, not stale
        assert_eq!(table.get(0).page_table, vec![None, None, None, Some(3)]);
    }

    #[test]
    fn test_lru_evicts_least_recent_with_index_tie_break() {
        let mut table = table(&[10, 1]);
        let mut pager = PageManager::new(4);

        assert!(pager.allocate_pages(&mut table, 10, ReplacementPolicy::Lru).unwrap());
        // refresh frames 0 and 1; frame 2 now holds the stalest stamp
        pager.access_page(0);
        pager.access_page(1);

        assert!(pager.allocate_pages(&mut table, 1, ReplacementPolicy::Lru).unwrap());
        // P1 needs 2 pages: victims are frames 2 then 3 (oldest stamps)
        assert_eq!(table.get(1).page_table, vec![Some(2), Some(3)]);
        assert_eq!(table.get(0).page_table, vec![Some(0), Some(1), None, None]);
    }

    #[test]
    fn test_fifo_and_lru_pick_different_victims() {
        let run = |policy: ReplacementPolicy| -> usize {
            let mut table = table(&[10, 1]);
            let mut pager = PageManager::new(4);
            pager.allocate_pages(&mut table, 10, policy).unwrap();
            // make frame 0 the most recently used; FIFO must still take it
            pager.access_page(3);
            pager.access_page(2);
            pager.access_page(1);
            pager.access_page(0);
            pager.allocate_pages(&mut table, 1, policy).unwrap();
            table.get(1).page_table[0].unwrap()
        };

        assert_eq!(run(ReplacementPolicy::Fifo), 0);
        assert_eq!(run(ReplacementPolicy::Lru), 3);
    }

    #[test]
    fn test_request_beyond_capacity_reports_partial() {
        // pid 10 -> 4 pages, only 2 frames
        let mut table = table(&[10]);
        let mut pager = PageManager::new(2);

        let all_bound = pager.allocate_pages(&mut table, 10, ReplacementPolicy::Fifo).unwrap();
        assert!(!all_bound);
        let bound = table.get(0).page_table.iter().filter(|s| s.is_some()).count();
        assert_eq!(bound, 2);
    }

    #[test]
    fn test_deallocate_pages_frees_frames_and_order_queue() {
        let mut table = table(&[1, 5]);
        let mut pager = PageManager::new(8);
        pager.allocate_pages(&mut table, 1, ReplacementPolicy::Fifo).unwrap();
        pager.allocate_pages(&mut table, 5, ReplacementPolicy::Fifo).unwrap();

        pager.deallocate_pages(&mut table, 1).unwrap();
        assert!(table.get(0).page_table.iter().all(Option::is_none));
        assert!(pager.frames()[0].owner.is_none());
        assert!(pager.frames()[1].owner.is_none());
        // P5 untouched
        assert_eq!(table.get(1).page_table, vec![Some(2), Some(3), Some(4)]);
    }
}
