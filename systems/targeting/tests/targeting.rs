use horde_core::{Handle, PoolId, Vec2};
use horde_system_targeting::{CandidateBuffer, CandidateSource, TargetAcquisition, TargetCandidate};

struct Arena {
    hostiles: Vec<TargetCandidate>,
}

impl Arena {
    fn new(positions: &[(f32, f32, bool)]) -> Self {
        let hostiles = positions
            .iter()
            .enumerate()
            .map(|(slot, &(x, y, active))| TargetCandidate {
                handle: handle(slot as u32),
                position: Vec2::new(x, y),
                active,
            })
            .collect();
        Self { hostiles }
    }
}

impl CandidateSource for Arena {
    fn overlap(&self, origin: Vec2, radius: f32, buffer: &mut CandidateBuffer) {
        for candidate in &self.hostiles {
            if candidate.position.distance(origin) <= radius && !buffer.push(*candidate) {
                break;
            }
        }
    }
}

fn handle(slot: u32) -> Handle {
    Handle::new(PoolId::new(0), slot)
}

#[test]
fn picks_the_closest_candidate() {
    let arena = Arena::new(&[(50.0, 0.0, true), (0.0, 20.0, true), (-30.0, 0.0, true)]);
    let mut targeting = TargetAcquisition::new(8);

    assert_eq!(
        targeting.find_nearest(Vec2::ZERO, 100.0, &arena),
        Some(handle(1))
    );
}

#[test]
fn skips_inactive_candidates() {
    let arena = Arena::new(&[(5.0, 0.0, false), (40.0, 0.0, true)]);
    let mut targeting = TargetAcquisition::new(8);

    assert_eq!(
        targeting.find_nearest(Vec2::ZERO, 100.0, &arena),
        Some(handle(1))
    );
}

#[test]
fn returns_none_when_nothing_is_in_range() {
    let arena = Arena::new(&[(500.0, 0.0, true)]);
    let mut targeting = TargetAcquisition::new(8);

    assert_eq!(targeting.find_nearest(Vec2::ZERO, 100.0, &arena), None);
    assert_eq!(
        targeting.find_nearest(Vec2::ZERO, 100.0, &Arena::new(&[])),
        None
    );
}

#[test]
fn candidates_beyond_capacity_are_never_considered() {
    let arena = Arena::new(&[(80.0, 0.0, true), (60.0, 0.0, true), (10.0, 0.0, true)]);
    let mut targeting = TargetAcquisition::new(2);

    assert_eq!(
        targeting.find_nearest(Vec2::ZERO, 100.0, &arena),
        Some(handle(1))
    );
}

#[test]
fn buffer_is_reused_between_queries() {
    let near = Arena::new(&[(1.0, 0.0, true)]);
    let far = Arena::new(&[(90.0, 0.0, true), (95.0, 0.0, true)]);
    let mut targeting = TargetAcquisition::new(2);

    assert_eq!(
        targeting.find_nearest(Vec2::ZERO, 100.0, &near),
        Some(handle(0))
    );
    assert_eq!(
        targeting.find_nearest(Vec2::ZERO, 100.0, &far),
        Some(handle(0))
    );
    assert_eq!(targeting.capacity(), 2);
}

#[test]
fn candidate_query_reports_the_observed_position() {
    let arena = Arena::new(&[(0.0, 30.0, true), (0.0, -10.0, true)]);
    let mut targeting = TargetAcquisition::new(4);

    let nearest = targeting
        .find_nearest_candidate(Vec2::ZERO, 100.0, &arena)
        .expect("candidate in range");
    assert_eq!(nearest.handle, handle(1));
    assert_eq!(nearest.position, Vec2::new(0.0, -10.0));
}
