//! Bounded-entity overlap tests.

use orrery_engine::bounded::overlaps;
use orrery_engine::prelude::*;
use proptest::prelude::*;

fn sprite(w: u32, h: u32) -> Sprite {
    Sprite::new("test.gif", w, h).unwrap()
}

fn hostile(x: f64, y: f64, w: u32, h: u32) -> HostileEntity {
    HostileEntity::new(sprite(w, h), x, y, 0.0, Playfield::default())
}

fn box_strategy() -> impl Strategy<Value = (i32, i32, u32, u32)> {
    (-200..200i32, -200..200i32, 0..80u32, 0..80u32)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn intersection_is_symmetric(a in box_strategy(), b in box_strategy()) {
        let ba = Aabb::new(a.0, a.1, a.2, a.3);
        let bb = Aabb::new(b.0, b.1, b.2, b.3);
        prop_assert_eq!(ba.intersects(&bb), bb.intersects(&ba));
    }

    #[test]
    fn non_empty_box_intersects_itself(b in box_strategy()) {
        let bx = Aabb::new(b.0, b.1, b.2, b.3);
        prop_assert_eq!(bx.intersects(&bx), !bx.is_empty());
    }

    /// Entity-level overlap agrees with the box test and with itself in
    /// either argument order.
    #[test]
    fn entity_overlap_matches_boxes(
        a in (-200.0..200.0f64, -200.0..200.0f64, 1..60u32, 1..60u32),
        b in (-200.0..200.0f64, -200.0..200.0f64, 1..60u32, 1..60u32),
    ) {
        let ea = hostile(a.0, a.1, a.2, a.3);
        let eb = hostile(b.0, b.1, b.2, b.3);
        let expected = Aabb::of(&ea).intersects(&Aabb::of(&eb));
        prop_assert_eq!(overlaps(&ea, &eb), expected);
        prop_assert_eq!(overlaps(&eb, &ea), expected);
        prop_assert_eq!(ea.collides_with(&eb), eb.collides_with(&ea));
    }

    /// Boxes separated along x by at least the left box's width never touch.
    #[test]
    fn separated_boxes_never_intersect(
        x in -500..500i32,
        y in -500..500i32,
        w in 1..100u32,
        h in 1..100u32,
        gap in 0..50i32,
    ) {
        let left = Aabb::new(x, y, w, h);
        let right = Aabb::new(x + w as i32 + gap, y, w, h);
        prop_assert!(!left.intersects(&right));
    }
}

#[test]
fn ship_and_hostile_rectangles() {
    let ship = ShipEntity::new(sprite(32, 24), 370.0, 550.0, Playfield::default());

    // Overlaps the ship's top-left corner.
    assert!(overlaps(&ship, &hostile(350.0, 535.0, 28, 20)));
    // Touches the ship's left edge exactly.
    assert!(!overlaps(&ship, &hostile(342.0, 550.0, 28, 20)));
    // One pixel further in.
    assert!(overlaps(&ship, &hostile(343.0, 550.0, 28, 20)));
    // Directly above, sharing the top edge.
    assert!(!overlaps(&ship, &hostile(370.0, 530.0, 28, 20)));
}

#[test]
fn fractional_positions_truncate_before_testing() {
    // 10.9 truncates to 10, so this 10-wide box ends at 20 and misses x = 20.
    let a = hostile(10.9, 0.0, 10, 10);
    let b = hostile(20.0, 0.0, 10, 10);
    assert!(!overlaps(&a, &b));

    // -0.5 truncates toward zero, to 0.
    let c = hostile(-0.5, 0.0, 10, 10);
    assert_eq!(Aabb::of(&c).x, 0);
}

#[test]
fn unbounded_entities_never_collide() {
    let planet = PlanetEntity::new("p", Kinematics::at(5.0, 5.0), 1.0, Some(sprite(50, 50))).unwrap();
    let h = hostile(5.0, 5.0, 28, 20);
    assert!(!planet.is_bounded());
    assert!(!planet.collides_with(&h));
}

#[test]
fn shot_hit_issues_removals_and_signal_in_order() {
    let mut shot = ShotEntity::new(sprite(6, 16), 100.0, 100.0, -300.0);
    let target = hostile(95.0, 95.0, 28, 20);
    assert!(shot.collides_with(&target));

    let mut alloc = EntityAllocator::new();
    let shot_id = alloc.allocate();
    let hostile_id = alloc.allocate();

    let mut commands = CommandBuffer::new();
    shot.collided_with(shot_id, hostile_id, &target, &mut commands);
    shot.collided_with(shot_id, hostile_id, &target, &mut commands);

    let kinds: Vec<String> = commands
        .commands()
        .iter()
        .map(|c| match &c.kind {
            CommandKind::Remove(id) => format!("remove {id}"),
            CommandKind::Signal(s) => format!("signal {s:?}"),
            CommandKind::Spawn(_) => "spawn".to_owned(),
            CommandKind::RequestLogic => "logic".to_owned(),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            format!("remove {shot_id}"),
            format!("remove {hostile_id}"),
            "signal HostileEliminated".to_owned(),
        ]
    );
    assert!(shot.is_used());
}
