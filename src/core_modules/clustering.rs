// THEORY:
// The `clustering` module finds the dominant color of a region. A cropped sign
// is rarely one flat color: the sign face, its border, lettering and a sliver of
// sky all land inside the box. Splitting the pixels into two color clusters and
// keeping the larger one separates the sign's face from that noise.
//
// Algorithm (Lloyd's k-means):
// 1.  **Seeding**: deterministic farthest-point seeding. The first seed is the
//     first point; each following seed is the point farthest from every seed
//     chosen so far (ties go to the earlier point). No randomness, so a region
//     always clusters the same way.
// 2.  **Assignment**: every point joins its nearest centroid (ties go to the
//     lower cluster index).
// 3.  **Update**: each centroid moves to the mean of its members. A cluster that
//     lost all members keeps its previous centroid.
// 4.  Steps 2-3 repeat until no assignment changes or `MAX_ITERATIONS` is hit.

use crate::core_modules::pixel::Color;
use crate::error::CheckError;

pub const MAX_ITERATIONS: usize = 100;

/// One color cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub centroid: Color,
    /// Number of points assigned to this cluster.
    pub members: usize,
}

/// The result of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    pub iterations: usize,
}

impl Clustering {
    /// The cluster with the most members; ties go to the lower index.
    pub fn dominant(&self) -> &Cluster {
        let mut dominant = &self.clusters[0];
        for cluster in &self.clusters[1..] {
            if cluster.members > dominant.members {
                dominant = cluster;
            }
        }
        dominant
    }
}

/// Partitions `points` into `k` clusters.
///
/// Fails with `CheckError::Clustering` when `k` is zero or there are fewer
/// points than clusters.
pub fn k_means(points: &[Color], k: usize) -> Result<Clustering, CheckError> {
    if k == 0 || points.len() < k {
        return Err(CheckError::Clustering {
            points: points.len(),
            clusters: k,
        });
    }

    let mut centroids = seed(points, k);
    let mut assignments = vec![usize::MAX; points.len()];
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS {
        iterations += 1;

        let mut changed = false;
        for (point, assignment) in points.iter().zip(assignments.iter_mut()) {
            let nearest = nearest_centroid(point, &centroids);
            if *assignment != nearest {
                *assignment = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        for (index, centroid) in centroids.iter_mut().enumerate() {
            let members = points
                .iter()
                .zip(&assignments)
                .filter(|(_, assignment)| **assignment == index)
                .map(|(point, _)| point);
            if let Some(mean) = Color::mean(members) {
                *centroid = mean;
            }
        }
    }

    let clusters = centroids
        .into_iter()
        .enumerate()
        .map(|(index, centroid)| Cluster {
            centroid,
            members: assignments.iter().filter(|a| **a == index).count(),
        })
        .collect();

    Ok(Clustering {
        clusters,
        iterations,
    })
}

fn seed(points: &[Color], k: usize) -> Vec<Color> {
    let mut seeds = Vec::with_capacity(k);
    seeds.push(points[0]);

    while seeds.len() < k {
        let mut farthest = points[0];
        let mut farthest_distance = f64::NEG_INFINITY;
        for point in points {
            let distance = seeds
                .iter()
                .map(|seed| point.distance_squared(seed))
                .fold(f64::INFINITY, f64::min);
            if distance > farthest_distance {
                farthest = *point;
                farthest_distance = distance;
            }
        }
        seeds.push(farthest);
    }

    seeds
}

fn nearest_centroid(point: &Color, centroids: &[Color]) -> usize {
    let mut best = 0;
    let mut best_distance = point.distance_squared(&centroids[0]);
    for (index, centroid) in centroids.iter().enumerate().skip(1) {
        let distance = point.distance_squared(centroid);
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}
