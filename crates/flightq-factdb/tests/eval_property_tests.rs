use flightq_factdb::{Answer, FactStore};
use flightq_nlp::{Arg, Command, Condition, Predicate, ProceduralQuery, Procedure};
use proptest::prelude::*;

const PLANES: &[&str] = &["VN1", "VN2", "VN3", "VJ1", "VJ2", "VJ5"];
const CITIES: &[&str] = &["HUE", "ĐN", "HN", "HCM", "HP", "KH"];
const TIMES: &[&str] = &["7:00HR", "8:30HR", "10:00HR", "13:30HR"];

fn pick(values: &'static [&'static str]) -> impl Strategy<Value = String> {
    proptest::sample::select(values).prop_map(str::to_string)
}

fn fact_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (pick(PLANES), pick(CITIES), pick(TIMES)).prop_map(|(p, c, t)| format!("(ATIME {p} {c} {t})")),
        (pick(PLANES), pick(CITIES), pick(TIMES)).prop_map(|(p, c, t)| format!("(DTIME {p} {c} {t})")),
        (pick(PLANES), pick(CITIES), pick(CITIES), pick(TIMES))
            .prop_map(|(p, s, d, t)| format!("(RUN-TIME {p} {s} {d} {t})")),
        pick(PLANES).prop_map(|p| format!("(MÁY_BAY {p})")),
    ]
}

fn facts() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(fact_line(), 0..30)
}

fn arg(values: &'static [&'static str]) -> impl Strategy<Value = Arg> {
    prop_oneof![pick(values).prop_map(Arg::Bound), Just(Arg::Wildcard)]
}

/// The plane column is either the `?m1` variable or a bound id, shared by
/// `MÁY_BAY` and the family condition the way the translator writes it.
fn plane() -> impl Strategy<Value = Arg> {
    prop_oneof![Just(Arg::var("m1")), pick(PLANES).prop_map(Arg::Bound)]
}

fn query() -> impl Strategy<Value = Procedure> {
    let family = prop_oneof![
        (arg(CITIES), arg(TIMES)).prop_map(|(c, t)| (Predicate::ArrivalTime, vec![c, t])),
        (arg(CITIES), arg(TIMES)).prop_map(|(c, t)| (Predicate::DepartureTime, vec![c, t])),
        (arg(CITIES), arg(CITIES)).prop_map(|(s, d)| (Predicate::RouteTime, vec![s, d, Arg::var("time")])),
    ];
    (plane(), family, any::<bool>()).prop_map(|(plane, (predicate, rest), project_time)| {
        let mut args = vec![plane.clone()];
        args.extend(rest);
        let output = if predicate == Predicate::RouteTime && project_time { "time" } else { "m1" };
        Procedure::Query(ProceduralQuery {
            command: Command::PrintAll,
            output: output.to_string(),
            conditions: vec![Condition::new(Predicate::Plane, vec![plane]), Condition::new(predicate, args)],
        })
    })
}

fn is_sorted<T: Ord>(items: &[T]) -> bool {
    items.windows(2).all(|w| w[0] < w[1])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn answers_are_deterministic_and_sorted(mut lines in facts(), query in query()) {
        let store = FactStore::parse(&lines.join("\n"));
        let answer = store.query(&query);

        lines.reverse();
        let shuffled = FactStore::parse(&lines.join("\n"));
        prop_assert_eq!(&shuffled.query(&query), &answer);
        prop_assert_eq!(store.query(&query).to_string(), answer.to_string());

        match &answer {
            Answer::Planes(v) | Answer::Values(v) => {
                prop_assert!(!v.is_empty());
                prop_assert!(is_sorted(v));
            }
            Answer::Pairs(v) => {
                prop_assert!(!v.is_empty());
                prop_assert!(is_sorted(v));
            }
            Answer::NoResults => {}
            other => prop_assert!(false, "unexpected answer {:?}", other),
        }
    }

    #[test]
    fn surviving_planes_are_known_planes(lines in facts(), query in query()) {
        let store = FactStore::parse(&lines.join("\n"));
        if let Answer::Planes(planes) = store.query(&query) {
            let known = store.known_planes();
            prop_assert!(planes.iter().all(|p| known.contains(p.as_str())));
        }
    }

    #[test]
    fn bound_plane_answers_at_most_that_plane(lines in facts(), id in pick(PLANES), city in pick(CITIES)) {
        let store = FactStore::parse(&lines.join("\n"));
        let query: Procedure = format!("(PRINT-ALL ?m1 (MÁY_BAY {id})(ATIME {id} {city} ?))").parse().expect("procedural form");
        let expected = if store.arrivals().iter().any(|f| f.plane == id && f.city == city) {
            Answer::Planes(vec![id.clone()])
        } else {
            Answer::NoResults
        };
        prop_assert_eq!(store.query(&query), expected);
    }
}
