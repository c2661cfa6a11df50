//! Selection of a workflow's final output.

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbImage;
use operators::{Channel, PortMap};

use crate::models::WorkflowGraph;
use crate::EngineError;

/// Channels checked, in order, for the final image.
pub const RESULT_CHANNELS: [Channel; 2] = [Channel::Image, Channel::Output];

/// The chosen sink and the image it produced.
#[derive(Debug, Clone)]
pub struct FinalOutput {
    pub node_id: String,
    pub image: Arc<RgbImage>,
    /// Everything the sink emitted, including non-image channels.
    pub outputs: PortMap,
}

/// Pick the final result.
///
/// The sink (node without outgoing edges) that comes first in submission
/// order wins. A graph without sinks cannot be acyclic, but should one reach
/// here the last executed node is used.
///
/// # Errors
/// - [`EngineError::EmptyGraph`] if the graph has no nodes.
/// - [`EngineError::NoOutput`] if the chosen node has no image on `image`
///   or `output`.
pub fn resolve(
    graph: &WorkflowGraph,
    outputs_by_node: &HashMap<String, PortMap>,
    order: &[String],
) -> Result<FinalOutput, EngineError> {
    if graph.is_empty() {
        return Err(EngineError::EmptyGraph);
    }

    let chosen = match graph.sinks().next() {
        Some(sink) => sink.id.as_str(),
        None => order.last().map(String::as_str).ok_or(EngineError::EmptyGraph)?,
    };

    let no_output = || EngineError::NoOutput {
        node_id: chosen.to_owned(),
    };
    let outputs = outputs_by_node.get(chosen).ok_or_else(no_output)?;
    let image = RESULT_CHANNELS
        .iter()
        .find_map(|ch| outputs.get(ch).and_then(|v| v.as_image()))
        .cloned()
        .ok_or_else(no_output)?;

    Ok(FinalOutput {
        node_id: chosen.to_owned(),
        image,
        outputs: outputs.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::validate;
    use crate::models::{RawEdge, RawNode, WorkflowSubmission};
    use crate::OperatorRegistry;
    use operators::mock::{shade_of, solid, MockOperator};
    use operators::{image_outputs, ChannelValue};

    fn graph(ids: &[&str], edges: Vec<RawEdge>) -> WorkflowGraph {
        let mut registry = OperatorRegistry::new();
        registry
            .register(MockOperator::descriptor("mock"), Arc::new(MockOperator::passthrough("mock")))
            .unwrap();
        let sub = WorkflowSubmission::new(ids.iter().map(|id| RawNode::new(*id, "mock")).collect(), edges);
        validate(&sub, &registry).unwrap()
    }

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn outputs(entries: &[(&str, PortMap)]) -> HashMap<String, PortMap> {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn single_sink_is_the_result() {
        let g = graph(&["a", "b"], vec![RawEdge::new("a", "b")]);
        let outs = outputs(&[("a", image_outputs(solid(1))), ("b", image_outputs(solid(2)))]);
        let result = resolve(&g, &outs, &order(&["a", "b"])).unwrap();
        assert_eq!(result.node_id, "b");
        assert_eq!(shade_of(&ChannelValue::Image(result.image)), Some(2));
    }

    #[test]
    fn earliest_submitted_sink_wins() {
        // Both sinks; 'b' executes first but 'a' was submitted first.
        let g = graph(&["a", "b"], vec![]);
        let outs = outputs(&[("a", image_outputs(solid(1))), ("b", image_outputs(solid(2)))]);
        let result = resolve(&g, &outs, &order(&["b", "a"])).unwrap();
        assert_eq!(result.node_id, "a");
    }

    #[test]
    fn output_channel_is_used_when_image_is_absent() {
        let g = graph(&["a"], vec![]);
        let mut ports = PortMap::new();
        ports.insert(Channel::Output, ChannelValue::image(solid(7)));
        let result = resolve(&g, &outputs(&[("a", ports)]), &order(&["a"])).unwrap();
        assert_eq!(shade_of(&ChannelValue::Image(result.image)), Some(7));
    }

    #[test]
    fn text_only_sink_has_no_output() {
        let g = graph(&["a"], vec![]);
        let mut ports = PortMap::new();
        ports.insert(Channel::Text, ChannelValue::Text("hello".into()));
        ports.insert(Channel::Roi, ChannelValue::image(solid(3)));
        assert!(matches!(
            resolve(&g, &outputs(&[("a", ports)]), &order(&["a"])),
            Err(EngineError::NoOutput { node_id }) if node_id == "a"
        ));
    }

    #[test]
    fn empty_graph_is_an_error() {
        let g = graph(&[], vec![]);
        assert!(matches!(resolve(&g, &HashMap::new(), &[]), Err(EngineError::EmptyGraph)));
    }
}
