use outpost_foreman::*;
use rstest::rstest;

fn consumer(x: f64, y: f64, size: u32) -> PowerEntity {
    PowerEntity::new(WorldPoint::new(x, y), size, true)
}

fn cells_of(entity: &PowerEntity) -> Vec<(i64, i64)> {
    let (cx, cy) = entity.position.cell();
    let size = entity.size as i64;
    let half = size / 2;
    (0..size * size)
        .map(|i| (cx + i % size - half, cy + i / size - half))
        .collect()
}

fn powers(pole: &PlacedEntity, entity: &PowerEntity) -> bool {
    let (px, py) = pole.position.cell();
    cells_of(entity)
        .iter()
        .any(|&(x, y)| (x - px).abs() <= 3 && (y - py).abs() <= 3)
}

/// Poles form one network when every pole can be reached over wires of
/// length 9 or less.
fn is_wired(poles: &[PlacedEntity]) -> bool {
    if poles.is_empty() {
        return true;
    }
    let mut reached = vec![false; poles.len()];
    let mut open = vec![0];
    reached[0] = true;
    while let Some(i) = open.pop() {
        for j in 0..poles.len() {
            let dx = poles[i].position.x - poles[j].position.x;
            let dy = poles[i].position.y - poles[j].position.y;
            if !reached[j] && dx * dx + dy * dy <= 81.0 {
                reached[j] = true;
                open.push(j);
            }
        }
    }
    reached.iter().all(|&r| r)
}

#[test]
fn neighbours_share_one_pole() {
    let entities = vec![consumer(0.5, 0.5, 3), consumer(4.5, 0.5, 3)];
    let plan = generate_poles(&entities, &PoleConfig::default()).unwrap();

    assert_eq!(plan.info.total_poles, 1);
    assert_eq!(plan.poles[0].name, "medium-electric-pole");
    assert!(entities.iter().all(|e| powers(&plan.poles[0], e)));
}

#[rstest]
#[case::pair(vec![consumer(0.5, 0.5, 3), consumer(40.5, 0.5, 3)])]
#[case::row(vec![
    consumer(0.5, 0.5, 3),
    consumer(12.5, 0.5, 3),
    consumer(24.5, 0.5, 3),
    consumer(36.5, 0.5, 3),
])]
#[case::scattered(vec![
    consumer(0.5, 0.5, 3),
    consumer(20.5, 3.5, 5),
    consumer(-8.5, 18.5, 3),
    consumer(14.5, 25.5, 3),
    PowerEntity::new(WorldPoint::new(6.5, 10.5), 3, false),
])]
fn every_consumer_is_powered_and_wired(#[case] entities: Vec<PowerEntity>) {
    let plan = generate_poles(&entities, &PoleConfig::default()).unwrap();

    for entity in entities.iter().filter(|e| e.needs_power) {
        assert!(
            plan.poles.iter().any(|p| powers(p, entity)),
            "{:?} has no pole",
            entity.position
        );
    }

    let occupied: Vec<(i64, i64)> = entities.iter().flat_map(cells_of).collect();
    for pole in &plan.poles {
        assert!(!occupied.contains(&pole.position.cell()));
    }

    assert!(plan.info.fully_connected);
    assert!(is_wired(&plan.poles));
    assert_eq!(plan.info.total_poles, plan.poles.len());
}

#[test]
fn gaps_are_bridged_with_extra_poles() {
    let entities = vec![consumer(0.5, 0.5, 3), consumer(40.5, 0.5, 3)];
    let plan = generate_poles(&entities, &PoleConfig::default()).unwrap();

    assert!(plan.info.total_poles > 2);
    assert_eq!(plan.visualizations.len(), 2);
    assert_eq!(plan.visualizations[0].color, Some(0x00bfff));
    assert_eq!(plan.visualizations[0].path.len(), 2);
    assert_eq!(plan.visualizations[1].color, Some(0x8a2be2));
    assert_eq!(plan.visualizations[1].path.len(), plan.info.total_poles - 2);
}

#[test]
fn repeated_runs_are_identical() {
    let entities = vec![consumer(0.5, 0.5, 3), consumer(17.5, 9.5, 3), consumer(-5.5, 21.5, 3)];
    let first = generate_poles(&entities, &PoleConfig::default()).unwrap();
    let second = generate_poles(&entities, &PoleConfig::default()).unwrap();
    assert_eq!(first, second);
}

#[rstest]
#[case::nothing(vec![])]
#[case::no_consumers(vec![PowerEntity::new(WorldPoint::new(0.5, 0.5), 3, false)])]
fn nothing_to_power(#[case] entities: Vec<PowerEntity>) {
    let plan = generate_poles(&entities, &PoleConfig::default()).unwrap();
    assert_eq!(plan, PolePlan::default());
    assert!(plan.info.fully_connected);
}

#[test]
fn exhausted_budget_cancels() {
    let entities = vec![consumer(0.5, 0.5, 3)];
    let budget = CpuBudget::new(|| false);
    let result = placement::place_poles(&entities, &PoleConfig::default(), &budget);
    assert_eq!(
        result,
        Err(PlanError::Cancelled {
            stage: "poles".to_string()
        })
    );
}

#[test]
fn non_finite_position_is_rejected() {
    let entities = vec![consumer(0.5, f64::INFINITY, 3)];
    assert!(matches!(
        generate_poles(&entities, &PoleConfig::default()),
        Err(PlanError::Configuration(ConfigurationError::NonFinitePosition { index: 0, .. }))
    ));
}

#[test]
fn config_loads_from_empty_json() {
    let config: PoleConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, PoleConfig::default());
}
