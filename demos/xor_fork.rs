//! End-to-end demonstration: builds the §8 Scenario 1 event graph by hand
//! (`A→B→C→F`, `A→B→D→F`, `A→B→E→F`) and prints the inferred PlantUML.

use tel2puml_core::config::JobConfig;
use tel2puml_core::model::event::Event;
use tel2puml_core::model::event_graph::EventGraph;
use tel2puml_core::run_pipeline;

fn main() {
    tracing_subscriber::fmt::init();

    let mut graph = EventGraph::new();
    let a = graph.add_event(Event::new("A", "a"));
    let b = graph.add_event(Event::new("B", "b"));
    let c = graph.add_event(Event::new("C", "c"));
    let d = graph.add_event(Event::new("D", "d"));
    let e = graph.add_event(Event::new("E", "e"));
    let f = graph.add_event(Event::new("F", "f"));

    graph.get_mut(a).update_event_sets(["B"]);
    graph.get_mut(b).update_event_sets(["C"]);
    graph.get_mut(b).update_event_sets(["D"]);
    graph.get_mut(b).update_event_sets(["E"]);
    graph.get_mut(c).update_event_sets(["F"]);
    graph.get_mut(d).update_event_sets(["F"]);
    graph.get_mut(e).update_event_sets(["F"]);

    for (src, dst) in [(a, b), (b, c), (b, d), (b, e), (c, f), (d, f), (e, f)] {
        graph.add_edge(src, dst);
    }

    let puml = run_pipeline(graph, &JobConfig::default()).expect("pipeline should succeed on a well-formed graph");
    println!("{}", puml.to_plantuml());
}
