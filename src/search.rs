//! Negamax game-tree search with alpha-beta pruning and a transposition table.
//!
//! The search enumerates moves exactly as the rules engine accepts them,
//! including the speculative quarto claim: every candidate first tries to
//! announce, and keeps the announcement only when the rules would accept it.
//!
//! Scoring is from the point of view of the side to move:
//! - a state whose last move announced a quarto is lost: `-(WIN_SCORE + depth)`
//! - a full board, or the depth cutoff, scores 0
//!
//! Adding the remaining depth makes quicker wins and slower losses preferable.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::constants::{DEFAULT_DEPTH, TT_CAPACITY, WIN_SCORE};
use crate::rules;
use crate::state::{GameState, Move};

const INFINITY: i32 = i32::MAX / 2;

/// Tunable search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Negamax depth in plies.
    pub depth: u8,
    /// Skip the random opening phase and search every move.
    pub always_search: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            always_search: false,
        }
    }
}

/// Every move shape the rules accept, before announcement resolution.
///
/// Cells ascend in the outer loop, next-piece indices in the inner one. The
/// next piece ranges over the whole post-placement pool.
pub fn candidate_moves(state: &GameState) -> Vec<Move> {
    if state.is_finished() {
        return Vec::new();
    }

    let pool = state.remaining_pieces().len();
    if state.piece_to_play().is_none() {
        return (0..pool).map(|n| Move::new(None, Some(n))).collect();
    }

    let after = pool - 1;
    let mut moves = Vec::with_capacity(state.board().empty_cells().count() * after.max(1));
    for cell in state.board().empty_cells() {
        if after == 0 {
            moves.push(Move::new(Some(cell), None));
        } else {
            moves.extend((0..after).map(|n| Move::place(cell, n)));
        }
    }
    moves
}

/// Claim a quarto if the rules would accept the claim, otherwise drop it.
pub fn resolve_claim(state: &GameState, mv: Move) -> Move {
    let claimed = mv.claiming();
    if rules::validate(state, &claimed).is_ok() {
        claimed
    } else {
        mv.unclaimed()
    }
}

/// Candidates with their announcement resolved, in enumeration order.
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    candidate_moves(state)
        .into_iter()
        .map(|mv| resolve_claim(state, mv))
        .collect()
}

/// Apply `mv` to a copy of `state`.
fn child(state: &GameState, mv: &Move) -> Option<GameState> {
    let mut next = state.clone();
    rules::apply_move(&mut next, mv).ok()?;
    Some(next)
}

/// Legal moves with winning claims first. The sort is stable, so the order
/// stays reproducible.
fn ordered_moves(state: &GameState) -> Vec<Move> {
    let mut moves = legal_moves(state);
    moves.sort_by_key(|mv| !mv.claims_quarto());
    moves
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    depth: u8,
    score: i32,
    bound: Bound,
}

/// Memoized scores keyed by `GameState::fingerprint`.
///
/// Flushed wholesale when full; entries are pure results, so losing them only
/// costs recomputation.
#[derive(Debug)]
pub struct TranspositionTable {
    entries: FxHashMap<u128, Entry>,
    capacity: usize,
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::with_capacity(TT_CAPACITY)
    }
}

impl TranspositionTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn probe(&self, key: u128) -> Option<Entry> {
        self.entries.get(&key).copied()
    }

    fn store(&mut self, key: u128, entry: Entry) {
        if self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        self.entries.insert(key, entry);
    }
}

/// Result of a root search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub mv: Move,
    pub score: i32,
    /// Nodes visited during this search.
    pub nodes: u64,
}

/// Depth-bounded negamax searcher. The table survives between searches.
#[derive(Debug)]
pub struct Searcher {
    depth: u8,
    table: TranspositionTable,
    nodes: u64,
}

impl Searcher {
    pub fn new(depth: u8) -> Self {
        Self::with_table(depth, TranspositionTable::default())
    }

    pub fn with_table(depth: u8, table: TranspositionTable) -> Self {
        Self {
            depth,
            table,
            nodes: 0,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Search `state` and return the best move for the side to move.
    ///
    /// Returns `None` only when the game is already over. Among equally
    /// scored moves the first in enumeration order wins.
    pub fn best_move(&mut self, state: &GameState) -> Option<SearchOutcome> {
        if state.is_finished() {
            return None;
        }
        self.nodes = 0;
        let depth = self.depth.max(1);

        let mut alpha = -INFINITY;
        let mut best: Option<(Move, i32)> = None;
        for mv in ordered_moves(state) {
            let Some(next) = child(state, &mv) else {
                continue;
            };
            let score = -self.negamax(&next, depth - 1, -INFINITY, -alpha);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((mv, score));
            }
            alpha = alpha.max(score);
        }

        let (mv, score) = best?;
        debug!(
            %mv,
            score,
            depth,
            nodes = self.nodes,
            table = self.table.len(),
            "search finished"
        );
        Some(SearchOutcome {
            mv,
            score,
            nodes: self.nodes,
        })
    }

    fn negamax(&mut self, state: &GameState, depth: u8, mut alpha: i32, mut beta: i32) -> i32 {
        self.nodes += 1;

        // The previous mover announced a quarto
        if state.quarto_announced() {
            return -(WIN_SCORE + depth as i32);
        }
        if depth == 0 || state.board().is_full() {
            return 0;
        }

        let key = state.fingerprint();
        let alpha_orig = alpha;
        if let Some(entry) = self.table.probe(key) {
            if entry.depth >= depth {
                match entry.bound {
                    Bound::Exact => return entry.score,
                    Bound::Lower => alpha = alpha.max(entry.score),
                    Bound::Upper => beta = beta.min(entry.score),
                }
                if alpha >= beta {
                    return entry.score;
                }
            }
        }

        let mut best = -INFINITY;
        for mv in ordered_moves(state) {
            let Some(next) = child(state, &mv) else {
                continue;
            };
            let score = -self.negamax(&next, depth - 1, -beta, -alpha);
            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        if best == -INFINITY {
            return 0;
        }

        let bound = if best <= alpha_orig {
            Bound::Upper
        } else if best >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.table.store(
            key,
            Entry {
                depth,
                score: best,
                bound,
            },
        );
        best
    }
}
