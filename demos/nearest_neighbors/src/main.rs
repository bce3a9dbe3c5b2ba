use argh::FromArgs;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ptcloud::cloud::{Axis, PointSet, SearchParams};

#[derive(FromArgs)]
/// Query a random point cloud for neighbors, radius matches and a box region
struct Args {
    /// number of points to generate
    #[argh(option, short = 'n', default = "10000")]
    num_points: usize,

    /// number of nearest neighbors to find
    #[argh(option, short = 'k', default = "8")]
    k: usize,

    /// search radius
    #[argh(option, short = 'r', default = "0.05")]
    radius: f64,

    /// maximum leaves to scan per query, 0 for an exact search
    #[argh(option, default = "0")]
    max_leaf_checks: usize,

    /// lay the points out as a square grid, like a back-projected depth map
    #[argh(switch)]
    organized: bool,

    /// random seed
    #[argh(option, default = "0")]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let points = (0..args.num_points)
        .map(|_| [rng.random::<f64>(), rng.random::<f64>(), rng.random::<f64>()])
        .collect::<Vec<_>>();
    let colors = points
        .iter()
        .map(|p| [(p[0] * 255.0) as u8, (p[1] * 255.0) as u8, (p[2] * 255.0) as u8])
        .collect::<Vec<_>>();

    let cloud = if args.organized {
        let side = (args.num_points as f64).sqrt() as usize;
        let n = side * side;
        PointSet::from_grid(
            side,
            side,
            points[..n].to_vec(),
            Some(colors[..n].to_vec()),
            None,
        )?
    } else {
        PointSet::new(points, Some(colors), None)?
    };

    println!(
        "point cloud: #{} points, {:?}, searched with {:?}",
        cloud.len(),
        cloud.organization(),
        cloud.search_strategy()
    );
    for axis in [Axis::X, Axis::Y, Axis::Z] {
        if let Some((min, max)) = cloud.bounds(axis) {
            println!("  {axis:?} limits: [{min:.3}, {max:.3}]");
        }
    }

    let query = [0.5, 0.5, 0.5];
    let params = SearchParams::sorted().with_max_leaf_checks(args.max_leaf_checks);

    let now = std::time::Instant::now();
    let (indices, distances) = cloud.find_k_nearest(&query, args.k, &params)?;
    log::info!("knn took {:?}", now.elapsed());
    println!("{} nearest neighbors of {query:?}:", indices.len());
    for (i, d) in indices.iter().zip(distances.iter()) {
        println!("  #{i} at {d:.4}");
    }

    let now = std::time::Instant::now();
    let (indices, _) = cloud.find_in_radius(&query, args.radius, &params)?;
    log::info!("radius search took {:?}", now.elapsed());
    println!("{} points within {} of {query:?}", indices.len(), args.radius);

    let roi = [[0.4, 0.6], [0.4, 0.6], [0.4, 0.6]];
    let now = std::time::Instant::now();
    let inside = cloud.find_in_box(&roi)?;
    log::info!("box search took {:?}", now.elapsed());
    println!("{} points inside {roi:?}", inside.len());

    let subset = cloud.select(&inside)?;
    if let Some(colors) = subset.colors() {
        println!("first colors inside the box: {:?}", &colors[..colors.len().min(3)]);
    }

    Ok(())
}
