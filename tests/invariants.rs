use proptest::prelude::*;

use yard_dispatch::{
    AllocationConfig, RangePolicy, RebalanceOutcome, Table, TieOrder, UnclassifiedPolicy,
    distribute,
};

const IDENTIFIERS: [&str; 6] = ["93YRBB", "93YHJD", "8A18SR", "ZZZZZZ", "9BWZZZ", ""];
const LOCATIONS: [&str; 9] = [
    "411B",
    "415",
    "102",
    "CIL2",
    "cil 7",
    "At Factory",
    "",
    "999",
    "55",
];

fn build_table(rows: &[(usize, usize)]) -> Table {
    let columns = ["CHASSI", "RUA", "VAGA", "COR"]
        .iter()
        .map(|column| column.to_string())
        .collect();
    let cells = rows
        .iter()
        .enumerate()
        .map(|(idx, (identifier, location))| {
            let prefix = IDENTIFIERS[*identifier];
            let identifier = if prefix.is_empty() {
                String::new()
            } else {
                format!("{prefix}{idx:05}")
            };
            vec![
                identifier,
                LOCATIONS[*location].to_string(),
                format!("V{idx}"),
                format!("color-{}", idx % 4),
            ]
        })
        .collect();
    Table::new(columns, cells).unwrap()
}

fn tie_order_strategy() -> impl Strategy<Value = TieOrder> {
    prop_oneof![Just(TieOrder::Ascending), Just(TieOrder::Seeded)]
}

fn range_policy_strategy() -> impl Strategy<Value = RangePolicy> {
    prop_oneof![
        Just(RangePolicy::LeastLoaded),
        Just(RangePolicy::ContiguousBlock)
    ]
}

fn unclassified_strategy() -> impl Strategy<Value = UnclassifiedPolicy> {
    prop_oneof![
        Just(UnclassifiedPolicy::Unassigned),
        Just(UnclassifiedPolicy::Balance),
        Just(UnclassifiedPolicy::Drop)
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn distribution_invariants_hold(
        rows in prop::collection::vec((0..IDENTIFIERS.len(), 0..LOCATIONS.len()), 0..120),
        worker_count in 1usize..9,
        seed in any::<u64>(),
        tie_order in tie_order_strategy(),
        range_policy in range_policy_strategy(),
        unclassified in unclassified_strategy(),
    ) {
        let table = build_table(&rows);
        let config = AllocationConfig {
            worker_count,
            tie_order,
            range_policy,
            unclassified,
            seed,
            ..AllocationConfig::default()
        };
        let result = distribute(&table, config.clone()).unwrap();

        // Spread is bounded by one.
        let loads = result.loads();
        let max = *loads.iter().max().unwrap();
        let min = *loads.iter().min().unwrap();
        prop_assert!(max - min <= 1, "loads {:?}", loads);
        prop_assert_eq!(result.rebalance.outcome, RebalanceOutcome::Balanced);

        // Loads account for exactly the allocated records.
        let classified = result.records.iter().filter(|r| r.is_classified()).count();
        let expected = match unclassified {
            UnclassifiedPolicy::Balance => table.len(),
            UnclassifiedPolicy::Unassigned | UnclassifiedPolicy::Drop => classified,
        };
        prop_assert_eq!(loads.iter().sum::<usize>(), expected);
        for record in &result.records {
            if record.is_classified() {
                prop_assert!(record.assigned.is_some_and(|w| w < worker_count));
            }
        }

        // Output keeps input order and leaves input cells untouched.
        let kept: Vec<&Vec<String>> = table
            .rows()
            .iter()
            .zip(&result.records)
            .filter(|(_, record)| {
                unclassified != UnclassifiedPolicy::Drop || record.is_classified()
            })
            .map(|(row, _)| row)
            .collect();
        prop_assert_eq!(result.table.len(), kept.len());
        for (out, input) in result.table.rows().iter().zip(kept) {
            prop_assert_eq!(&out[..input.len()], &input[..]);
        }

        // Same input, config, and seed give identical output.
        let again = distribute(&table, config).unwrap();
        prop_assert_eq!(again.table, result.table);
    }
}

#[test]
fn seven_classified_records_over_three_workers() {
    let rows = [(0, 0), (0, 1), (1, 2), (1, 3), (0, 4), (2, 7), (0, 8)];
    let table = build_table(&rows);
    let result = distribute(&table, AllocationConfig::with_workers(3)).unwrap();
    assert_eq!(result.loads(), vec![3, 2, 2]);
    assert_eq!(result.table.len(), 7);
    for (idx, row) in result.table.rows().iter().enumerate() {
        assert_eq!(row[2], format!("V{idx}"));
        assert!(row[4].starts_with("Worker "));
    }
}

#[test]
fn more_workers_than_records_leaves_some_idle() {
    let table = build_table(&[(0, 0), (1, 3), (2, 2)]);
    let result = distribute(&table, AllocationConfig::with_workers(5)).unwrap();
    assert_eq!(result.loads(), vec![1, 1, 1, 0, 0]);
    assert!(result.rebalance.is_balanced());
}

#[test]
fn single_worker_takes_everything() {
    let table = build_table(&[(0, 0), (1, 3), (3, 5), (2, 2)]);
    let config = AllocationConfig {
        worker_count: 1,
        worker_names: vec!["Ana".into()],
        unclassified: UnclassifiedPolicy::Balance,
        ..AllocationConfig::default()
    };
    let result = distribute(&table, config).unwrap();
    assert_eq!(result.loads(), vec![4]);
    assert!(result.table.rows().iter().all(|row| row[4] == "Ana"));
}

#[test]
fn empty_table_produces_empty_output() {
    let table = build_table(&[]);
    let result = distribute(&table, AllocationConfig::with_workers(2)).unwrap();
    assert!(result.table.is_empty());
    assert_eq!(result.loads(), vec![0, 0]);
    assert_eq!(result.table.columns().len(), 5);
}
