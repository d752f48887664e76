//! Get/put traces: text format, built-in reference run, and replay
//!
//! Trace format (one statement per line, `#` starts a comment):
//! ```text
//! capacity 10
//! put 10 13
//! get 13 -> miss
//! get 2 -> 19
//! get 4
//! ```
//!
//! `capacity` must come once, before the first operation. A `get` may carry
//! an expected outcome after `->`; a `get` without one is only recorded.

use std::fmt;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    sequence::{pair, preceded, tuple},
    IResult,
};
use tracing::debug;

use crate::cache::LruCache;
use crate::error::{Error, Result};
use crate::stats::CacheStats;

/// A single cache call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `get(key)`
    Get(i64),
    /// `put(key, value)`
    Put(i64, i64),
}

/// What a cache call returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `put` completed
    Stored,
    /// `get` found the value
    Hit(i64),
    /// `get` found nothing
    Miss,
}

impl Outcome {
    /// Render the way the original driver script printed results:
    /// `None` for a put and `-1` for a miss.
    pub fn legacy(&self) -> String {
        match self {
            Outcome::Stored => "None".to_string(),
            Outcome::Hit(value) => value.to_string(),
            Outcome::Miss => "-1".to_string(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Stored => write!(f, "stored"),
            Outcome::Hit(value) => write!(f, "{}", value),
            Outcome::Miss => write!(f, "miss"),
        }
    }
}

/// One operation plus the outcome it must produce, if known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Call to make
    pub op: Op,
    /// Required outcome (only `get` steps carry one)
    pub expect: Option<Outcome>,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Op::Put(key, value) => write!(f, "put {} {}", key, value),
            Op::Get(key) => match self.expect {
                Some(expect) => write!(f, "get {} -> {}", key, expect),
                None => write!(f, "get {}", key),
            },
        }
    }
}

/// Ordered operations applied to one cache of `capacity` entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    /// Capacity of the cache the steps run against
    pub capacity: usize,
    /// Operations in order
    pub steps: Vec<Step>,
}

impl Trace {
    /// Parse the text trace format
    ///
    /// # Errors
    /// * `Error::Parse` - unknown statement, missing or repeated `capacity`
    pub fn parse(input: &str) -> Result<Self> {
        let mut capacity = None;
        let mut steps = Vec::new();

        for (idx, raw) in input.lines().enumerate() {
            let line = idx + 1;
            let text = raw.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }

            let (_, parsed) = all_consuming(statement)(text).map_err(|_| Error::Parse {
                line,
                message: format!("unrecognized statement '{}'", text),
            })?;

            match parsed {
                Statement::Capacity(value) => {
                    if capacity.is_some() {
                        return Err(Error::Parse {
                            line,
                            message: "capacity declared twice".to_string(),
                        });
                    }
                    if !steps.is_empty() {
                        return Err(Error::Parse {
                            line,
                            message: "capacity must precede operations".to_string(),
                        });
                    }
                    capacity = Some(value);
                }
                Statement::Step(step) => {
                    if capacity.is_none() {
                        return Err(Error::Parse {
                            line,
                            message: "operation before capacity".to_string(),
                        });
                    }
                    steps.push(step);
                }
            }
        }

        let capacity = capacity.ok_or_else(|| Error::Parse {
            line: input.lines().count().max(1),
            message: "missing capacity".to_string(),
        })?;

        Ok(Self { capacity, steps })
    }

    /// The fixed reference run: 109 calls against a capacity-10 cache
    pub fn reference() -> Self {
        Self {
            capacity: 10,
            steps: REFERENCE_STEPS.to_vec(),
        }
    }

    /// Number of steps that carry an expected outcome
    pub fn checked_steps(&self) -> usize {
        self.steps.iter().filter(|step| step.expect.is_some()).count()
    }
}

impl FromStr for Trace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "capacity {}", self.capacity)?;
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        Ok(())
    }
}

enum Statement {
    Capacity(usize),
    Step(Step),
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse)(input)
}

fn capacity_line(input: &str) -> IResult<&str, usize> {
    preceded(pair(tag("capacity"), space1), map_res(digit1, str::parse))(input)
}

fn expectation(input: &str) -> IResult<&str, Outcome> {
    alt((value(Outcome::Miss, tag("miss")), map(integer, Outcome::Hit)))(input)
}

fn get_line(input: &str) -> IResult<&str, Step> {
    map(
        tuple((
            tag("get"),
            space1,
            integer,
            opt(preceded(tuple((space0, tag("->"), space0)), expectation)),
        )),
        |(_, _, key, expect)| Step {
            op: Op::Get(key),
            expect,
        },
    )(input)
}

fn put_line(input: &str) -> IResult<&str, Step> {
    map(
        tuple((tag("put"), space1, integer, space1, integer)),
        |(_, _, key, _, value)| Step {
            op: Op::Put(key, value),
            expect: None,
        },
    )(input)
}

fn statement(input: &str) -> IResult<&str, Statement> {
    alt((
        map(capacity_line, Statement::Capacity),
        map(get_line, Statement::Step),
        map(put_line, Statement::Step),
    ))(input)
}

/// A step whose outcome differed from its expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// 0-based position in the trace
    pub index: usize,
    /// The step as written
    pub step: Step,
    /// What the cache actually returned
    pub actual: Outcome,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}: `{}` returned {}", self.index + 1, self.step, self.actual)
    }
}

/// Result of running a trace
#[derive(Debug, Clone)]
pub struct Replay {
    /// Capacity the cache ran with
    pub capacity: usize,
    /// One outcome per step, in order
    pub outcomes: Vec<Outcome>,
    /// Steps whose expectation did not hold
    pub mismatches: Vec<Mismatch>,
    /// Cache counters after the last step
    pub stats: CacheStats,
    /// Resident entries after the last step, least recently used first
    pub resident: Vec<(i64, i64)>,
}

impl Replay {
    /// True when every expectation held
    pub fn is_success(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Outcomes space-separated in the original driver's print format
    pub fn legacy_transcript(&self) -> String {
        self.outcomes
            .iter()
            .map(Outcome::legacy)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Apply one operation to `cache`
pub fn apply(cache: &mut LruCache<i64, i64>, op: Op) -> Outcome {
    match op {
        Op::Get(key) => match cache.get(&key) {
            Some(value) => Outcome::Hit(*value),
            None => Outcome::Miss,
        },
        Op::Put(key, value) => {
            cache.put(key, value);
            Outcome::Stored
        }
    }
}

/// Run `trace` against a fresh cache of the trace's capacity
///
/// # Errors
/// * `Error::InvalidCapacity` - the trace declares capacity 0
pub fn replay(trace: &Trace) -> Result<Replay> {
    replay_with_capacity(trace, trace.capacity)
}

/// Run `trace` against a fresh cache of `capacity` entries
///
/// # Errors
/// * `Error::InvalidCapacity` - `capacity` is 0
pub fn replay_with_capacity(trace: &Trace, capacity: usize) -> Result<Replay> {
    let mut cache = LruCache::new(capacity)?;
    let mut outcomes = Vec::with_capacity(trace.steps.len());
    let mut mismatches = Vec::new();

    for (index, step) in trace.steps.iter().enumerate() {
        let actual = apply(&mut cache, step.op);

        if let Some(expected) = step.expect {
            if expected != actual {
                debug!(index, %step, %actual, "trace expectation failed");
                mismatches.push(Mismatch {
                    index,
                    step: *step,
                    actual,
                });
            }
        }

        outcomes.push(actual);
    }

    Ok(Replay {
        capacity,
        outcomes,
        mismatches,
        stats: cache.stats(),
        resident: cache.iter().map(|(k, v)| (*k, *v)).collect(),
    })
}

const MISS: Outcome = Outcome::Miss;

const fn hit(value: i64) -> Outcome {
    Outcome::Hit(value)
}

const fn put(key: i64, value: i64) -> Step {
    Step {
        op: Op::Put(key, value),
        expect: None,
    }
}

const fn get(key: i64, expect: Outcome) -> Step {
    Step {
        op: Op::Get(key),
        expect: Some(expect),
    }
}

#[rustfmt::skip]
const REFERENCE_STEPS: &[Step] = &[
    put(10, 13),
    put(3, 17),
    put(6, 11),
    put(10, 5),
    put(9, 10),
    get(13, MISS),
    put(2, 19),
    get(2, hit(19)),
    get(3, hit(17)),
    put(5, 25),
    get(8, MISS),
    put(9, 22),
    put(5, 5),
    put(1, 30),
    get(11, MISS),
    put(9, 12),
    get(7, MISS),
    get(5, hit(5)),
    get(8, MISS),
    get(9, hit(12)),
    put(4, 30),
    put(9, 3),
    get(9, hit(3)),
    get(10, hit(5)),
    get(10, hit(5)),
    put(6, 14),
    put(3, 1),
    get(3, hit(1)),
    put(10, 11),
    get(8, MISS),
    put(2, 14),
    get(1, hit(30)),
    get(5, hit(5)),
    get(4, hit(30)),
    put(11, 4),
    put(12, 24),
    put(5, 18),
    get(13, MISS),
    put(7, 23),
    get(8, MISS),
    get(12, hit(24)),
    put(3, 27),
    put(2, 12),
    get(5, hit(18)),
    put(2, 9),
    put(13, 4),
    put(8, 18),
    put(1, 7),
    get(6, MISS),
    put(9, 29),
    put(8, 21),
    get(5, hit(18)),
    put(6, 30),
    put(1, 12),
    get(10, MISS),
    put(4, 15),
    put(7, 22),
    put(11, 26),
    put(8, 17),
    put(9, 29),
    get(5, hit(18)),
    put(3, 4),
    put(11, 30),
    get(12, MISS),
    put(4, 29),
    get(3, hit(4)),
    get(9, hit(29)),
    get(6, hit(30)),
    put(3, 4),
    get(1, hit(12)),
    get(10, MISS),
    put(3, 29),
    put(10, 28),
    put(1, 20),
    put(11, 13),
    get(3, hit(29)),
    put(3, 12),
    put(3, 8),
    put(10, 9),
    put(3, 26),
    get(8, hit(17)),
    get(7, hit(22)),
    get(5, hit(18)),
    put(13, 17),
    put(2, 27),
    put(11, 15),
    get(12, MISS),
    put(9, 19),
    put(2, 15),
    put(3, 16),
    get(1, hit(20)),
    put(12, 17),
    put(9, 1),
    put(6, 19),
    get(4, MISS),
    get(5, hit(18)),
    get(5, hit(18)),
    put(8, 1),
    put(11, 7),
    put(5, 2),
    put(9, 28),
    get(1, hit(20)),
    put(2, 2),
    put(7, 4),
    put(4, 22),
    put(7, 24),
    put(9, 26),
    put(13, 28),
    put(11, 26),
];
