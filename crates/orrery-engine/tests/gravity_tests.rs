//! Gravity pass and integration tests.
//!
//! Property tests check the conservation rules of the pass over random body
//! sets; the rest pin down the integration order and a two-body scenario.

use orrery_engine::prelude::*;
use proptest::prelude::*;

const EPS: f64 = 1e-9;

fn bodies_strategy() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec(
        (-1_000.0..1_000.0f64, -1_000.0..1_000.0f64, 0.1..10_000.0f64),
        0..12,
    )
}

fn build(specs: &[(f64, f64, f64)]) -> Vec<(Kinematics, GravityBody)> {
    specs
        .iter()
        .map(|&(x, y, m)| (Kinematics::at(x, y), GravityBody::new(m).unwrap()))
        .collect()
}

fn run_pass(system: &GravitySystem, bodies: &mut [(Kinematics, GravityBody)]) -> PassStats {
    system.apply(bodies.iter_mut().map(|(k, b)| (&*k, b)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Newton's third law: every pair contributes equal and opposite forces,
    /// so the accumulators of a pass sum to zero.
    #[test]
    fn net_force_of_a_pass_is_zero(specs in bodies_strategy()) {
        let system = GravitySystem::new(GravityConfig { g: 1.0, ..Default::default() });
        let mut bodies = build(&specs);
        run_pass(&system, &mut bodies);

        let (mut sx, mut sy, mut scale) = (0.0f64, 0.0f64, 0.0f64);
        for (_, b) in &bodies {
            let (fx, fy) = b.force();
            sx += fx;
            sy += fy;
            scale = scale.max(fx.abs()).max(fy.abs());
        }
        let tolerance = 1e-9 * scale.max(1.0);
        prop_assert!(sx.abs() <= tolerance, "sum fx = {sx}");
        prop_assert!(sy.abs() <= tolerance, "sum fy = {sy}");
    }

    /// A pair pass gives exactly negated forces.
    #[test]
    fn pair_forces_are_equal_and_opposite(
        a in (-500.0..500.0f64, -500.0..500.0f64, 0.1..1_000.0f64),
        b in (-500.0..500.0f64, -500.0..500.0f64, 0.1..1_000.0f64),
    ) {
        let system = GravitySystem::default();
        let mut bodies = build(&[a, b]);
        let stats = run_pass(&system, &mut bodies);

        let fa = bodies[0].1.force();
        let fb = bodies[1].1.force();
        prop_assert_eq!(fa, (-fb.0, -fb.1));
        prop_assert_eq!(stats.pairs_evaluated + stats.pairs_skipped, 1);
    }

    /// Each pass evaluates n(n-1)/2 pairs.
    #[test]
    fn pass_visits_half_the_pairs(specs in bodies_strategy()) {
        let mut bodies = build(&specs);
        let stats = run_pass(&GravitySystem::default(), &mut bodies);
        let n = specs.len();
        prop_assert_eq!(stats.bodies, n);
        prop_assert_eq!(stats.pairs_evaluated + stats.pairs_skipped, n * n.saturating_sub(1) / 2);
    }

    /// The force on a body points at the other body.
    #[test]
    fn force_points_toward_partner(
        dx in -300.0..300.0f64,
        dy in -300.0..300.0f64,
    ) {
        prop_assume!(dx.abs() > 1e-3 || dy.abs() > 1e-3);
        let mut bodies = build(&[(0.0, 0.0, 5.0), (dx, dy, 5.0)]);
        run_pass(&GravitySystem::default(), &mut bodies);

        let (fx, fy) = bodies[0].1.force();
        // Parallel and same direction: cross product ~ 0, dot product > 0.
        let cross = fx * dy - fy * dx;
        let dot = fx * dx + fy * dy;
        prop_assert!(dot > 0.0);
        prop_assert!(cross.abs() <= 1e-9 * (fx.hypot(fy) * dx.hypot(dy)).max(1e-12));
    }
}

#[test]
fn stale_forces_do_not_leak_between_passes() {
    let system = GravitySystem::new(GravityConfig {
        g: 1.0,
        ..Default::default()
    });

    // Pass 1: only A and B.
    let mut a = (Kinematics::at(0.0, 0.0), GravityBody::new(10.0).unwrap());
    let mut b = (Kinematics::at(10.0, 0.0), GravityBody::new(10.0).unwrap());
    system.apply([(&a.0, &mut a.1), (&b.0, &mut b.1)]);
    assert!(a.1.force().0 > 0.0);

    // Pass 2: A with a newcomer C on the other side, B absent.
    let mut c = (Kinematics::at(-20.0, 0.0), GravityBody::new(10.0).unwrap());
    system.apply([(&a.0, &mut a.1), (&c.0, &mut c.1)]);

    // Only C's pull remains: 1 * 10 * 10 / 400 toward -x.
    let (fx, fy) = a.1.force();
    assert!((fx + 0.25).abs() < EPS, "fx = {fx}");
    assert!(fy.abs() < EPS);
    assert!((c.1.force().0 - 0.25).abs() < EPS);
}

#[test]
fn velocity_updates_before_position() {
    let mut planet = PlanetEntity::new("pebble", Kinematics::at(0.0, 0.0), 10.0, None).unwrap();
    if let Some((_, body)) = planet.gravity_parts_mut() {
        body.accumulate(10.0, 0.0);
    }
    planet.advance(1000);

    let kin = planet.kinematics();
    assert!((kin.dx() - 1.0).abs() < EPS);
    assert!((kin.x() - 1.0).abs() < EPS);
    assert_eq!(kin.dy(), 0.0);
}

#[test]
fn two_body_scenario_pulls_toward_each_other() {
    let mut a = PlanetEntity::new("a", Kinematics::at(400.0, 300.0), 10_000.0, None).unwrap();
    let mut b = PlanetEntity::new(
        "b",
        Kinematics::at(500.0, 300.0).with_velocity(0.0, 15.0),
        10.0,
        None,
    )
    .unwrap();

    let system = GravitySystem::default();
    {
        let pa = a.gravity_parts_mut().unwrap();
        let pb = b.gravity_parts_mut().unwrap();
        system.apply([pa, pb]);
    }
    a.advance(16);
    b.advance(16);

    let (adx, bdx) = (a.kinematics().dx(), b.kinematics().dx());
    assert!(bdx < 0.0, "B pulled along -x, got {bdx}");
    assert!(adx > 0.0, "A pulled along +x, got {adx}");
    // Same force, so the velocity change scales with inverse mass.
    assert!((bdx / adx + 1_000.0).abs() < 1e-6, "ratio {}", bdx / adx);
    assert_eq!(b.kinematics().dy(), 15.0);
}

#[test]
fn coincident_bodies_are_skipped_without_nan() {
    let mut bodies = build(&[(5.0, 5.0, 1.0), (5.0, 5.0, 1.0), (15.0, 5.0, 1.0)]);
    let lenient = GravitySystem::new(GravityConfig {
        strict: false,
        ..Default::default()
    });
    let stats = run_pass(&lenient, &mut bodies);
    assert_eq!(stats.pairs_skipped, 1);
    assert_eq!(stats.pairs_evaluated, 2);
    for (_, b) in &bodies {
        let (fx, fy) = b.force();
        assert!(fx.is_finite() && fy.is_finite());
    }
}

#[test]
fn orbit_scenario_keeps_planets_bound_for_a_while() {
    let mut config = EngineConfig::default();
    config.frame_sleep_ms = 0;
    let mut game = GameLoop::new(config, &SpriteCatalog::with_defaults()).unwrap();

    game.frame(0, &InputSnapshot::any_key(), &mut (), &mut ());
    for t in 1..=500u64 {
        game.frame(t * 10, &InputSnapshot::IDLE, &mut (), &mut ());
    }

    let snap = game.snapshot();
    let sun = snap.find("sun").unwrap();
    let terra = snap.find("terra").unwrap();
    let r = ((terra.x - sun.x).powi(2) + (terra.y - sun.y).powi(2)).sqrt();
    assert!((50.0..200.0).contains(&r), "terra drifted to r = {r}");
}
