//! Per-resource-type visual styling: colors, icons, minimum sizes, and
//! the one-line configuration summaries shown on node cards.
//!
//! Colors follow the AWS console palette so the diagram reads like the
//! infrastructure it describes. Unknown resource types fall back to a
//! neutral style rather than failing.

use crate::consts::{CONTAINER_MIN_HEIGHT, CONTAINER_MIN_WIDTH};
use crate::scene::{Config, Node, ResourceStatus};

/// Visual style of a node, keyed by resource type.
#[derive(Debug, Clone, Copy)]
pub struct NodeStyle {
    /// Human-readable type label shown under the name.
    pub display_name: &'static str,
    /// Short glyph drawn in the header band.
    pub icon: &'static str,
    /// Header band / border accent as a CSS color.
    pub accent: &'static str,
    /// Containers with a dashed border mark logical (not physical)
    /// boundaries.
    pub dashed_border: bool,
    /// Minimum width in world units.
    pub min_width: f64,
    /// Minimum height in world units.
    pub min_height: f64,
}

const LEAF_MIN_WIDTH: f64 = 180.0;
const LEAF_MIN_HEIGHT: f64 = 90.0;

fn container_style(display_name: &'static str, icon: &'static str, accent: &'static str, dashed_border: bool) -> NodeStyle {
    NodeStyle {
        display_name,
        icon,
        accent,
        dashed_border,
        min_width: CONTAINER_MIN_WIDTH,
        min_height: CONTAINER_MIN_HEIGHT,
    }
}

fn leaf_style(display_name: &'static str, icon: &'static str, accent: &'static str) -> NodeStyle {
    NodeStyle {
        display_name,
        icon,
        accent,
        dashed_border: false,
        min_width: LEAF_MIN_WIDTH,
        min_height: LEAF_MIN_HEIGHT,
    }
}

/// Style for a resource type. Unknown types get the neutral fallback.
#[must_use]
pub fn node_style(resource_type: &str) -> NodeStyle {
    match resource_type {
        "aws_vpc" => container_style("VPC", "VPC", "#8C4FFF", false),
        "aws_subnet" => container_style("Subnet", "SN", "#7AA116", true),
        "aws_security_group" => container_style("Security Group", "SG", "#DD3522", true),
        "aws_autoscaling_group" => container_style("Auto Scaling Group", "ASG", "#ED7100", true),
        "aws_instance" => leaf_style("EC2 Instance", "EC2", "#ED7100"),
        "aws_rds_instance" => leaf_style("RDS Database", "RDS", "#C925D1"),
        "aws_s3_bucket" => leaf_style("S3 Bucket", "S3", "#7AA116"),
        "aws_lambda_function" => leaf_style("Lambda Function", "FN", "#ED7100"),
        _ => leaf_style("Resource", "RES", "#5F6B7A"),
    }
}

/// Color of the status dot for a provisioning state.
#[must_use]
pub fn status_color(status: ResourceStatus) -> &'static str {
    match status {
        ResourceStatus::Unknown => "#9AA5B1",
        ResourceStatus::Planning => "#B88700",
        ResourceStatus::Applying | ResourceStatus::Updating => "#0B7285",
        ResourceStatus::Created => "#2F9E44",
        ResourceStatus::Error => "#C92A2A",
        ResourceStatus::Destroyed => "#495057",
    }
}

/// One-line configuration summary for a container node's header, keyed
/// by resource type. `None` when the type has nothing worth showing or
/// the fields are absent.
#[must_use]
pub fn container_summary(node: &Node) -> Option<String> {
    let config = Config::new(&node.config);
    match node.resource_type.as_str() {
        "aws_vpc" => config.cidr_block().map(str::to_owned),
        "aws_subnet" => match (config.cidr_block(), config.availability_zone()) {
            (Some(cidr), Some(az)) => Some(format!("{cidr}, {az}")),
            (Some(cidr), None) => Some(cidr.to_owned()),
            (None, Some(az)) => Some(az.to_owned()),
            (None, None) => None,
        },
        "aws_autoscaling_group" => {
            let (min, max, desired) = (config.min_size(), config.max_size(), config.desired_capacity());
            if min.is_none() && max.is_none() && desired.is_none() {
                return None;
            }
            Some(format!(
                "min {}, max {}, desired {}",
                min.unwrap_or(0),
                max.unwrap_or(0),
                desired.unwrap_or(0),
            ))
        }
        _ => None,
    }
}

/// Short multi-line configuration summary for a leaf node's body, keyed
/// by resource type. Missing fields are simply omitted.
#[must_use]
pub fn leaf_summary_lines(node: &Node) -> Vec<String> {
    let config = Config::new(&node.config);
    let mut lines = Vec::new();
    match node.resource_type.as_str() {
        "aws_instance" => {
            if let Some(instance_type) = config.instance_type() {
                lines.push(instance_type.to_owned());
            }
            if let Some(ami) = config.ami() {
                lines.push(ami.to_owned());
            }
        }
        "aws_rds_instance" => {
            if let Some(engine) = config.engine() {
                lines.push(engine.to_owned());
            }
            if let Some(class) = config.instance_class() {
                lines.push(class.to_owned());
            }
        }
        _ => {}
    }
    lines
}
