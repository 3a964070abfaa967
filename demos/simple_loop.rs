//! End-to-end demonstration: builds the §8 Scenario 4 event graph
//! (`S → A → B → A → B → E`) and prints the inferred PlantUML, showing the
//! loop collapsed into a single `repeat` block.

use tel2puml_core::config::JobConfig;
use tel2puml_core::model::event::Event;
use tel2puml_core::model::event_graph::EventGraph;
use tel2puml_core::run_pipeline;

fn main() {
    tracing_subscriber::fmt::init();

    let mut graph = EventGraph::new();
    let s = graph.add_event(Event::new("S", "s"));
    let a = graph.add_event(Event::new("A", "a"));
    let b = graph.add_event(Event::new("B", "b"));
    let e = graph.add_event(Event::new("E", "e"));

    graph.get_mut(s).update_event_sets(["A"]);
    graph.get_mut(a).update_event_sets(["B"]);
    graph.get_mut(b).update_event_sets(["A"]);
    graph.get_mut(b).update_event_sets(["E"]);

    for (src, dst) in [(s, a), (a, b), (b, a), (b, e)] {
        graph.add_edge(src, dst);
    }

    let puml = run_pipeline(graph, &JobConfig::default()).expect("pipeline should succeed on a well-formed graph");
    println!("{}", puml.to_plantuml());
}
