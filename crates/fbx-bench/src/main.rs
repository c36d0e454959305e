//! Benchmark for FBX encoding/decoding.
//!
//! Loads a scene from disk (`.fbx`, or gzip-compressed `.fbx.gz`) or
//! synthesizes a mesh, then times encode and decode and reports sizes.
//!
//! Usage: `bench-scene [path] [--vertices N] [--json]`

use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};

use fbx::codec::{array_payload, deflate};
use fbx::{Document, decode_document, encode_document};
use serde::Serialize;

const DEFAULT_VERTICES: usize = 100_000;
const ITERATIONS: u32 = 5;

// =============================================================================
// INPUT
// =============================================================================

struct Args {
    path: Option<String>,
    vertices: usize,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        path: None,
        vertices: DEFAULT_VERTICES,
        json: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => args.json = true,
            "--vertices" => {
                args.vertices = iter
                    .next()
                    .and_then(|n| n.parse().ok())
                    .expect("--vertices takes a number");
            }
            _ => args.path = Some(arg),
        }
    }
    args
}

fn load_scene(path: &str) -> Vec<u8> {
    let data = fs::read(path).expect("Failed to read scene file");
    if Path::new(path).extension().is_some_and(|ext| ext == "gz") {
        let mut decoder = flate2::read::GzDecoder::new(data.as_slice());
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .expect("Failed to decompress");
        decompressed
    } else {
        data
    }
}

/// Builds a scene shaped like a typical exporter's output: header
/// records, one geometry with vertex, index and normal arrays, a model and
/// a connection between them.
fn synthesize_scene(vertices: usize) -> Document {
    let mut doc = Document::new(7400);

    let header = doc.create_record("FBXHeaderExtension", None).unwrap();
    let version = doc.create_record("FBXVersion", Some(header)).unwrap();
    doc[version].push(7400i32);
    let creator = doc.create_record("Creator", Some(header)).unwrap();
    doc[creator].push("bench-scene");

    let objects = doc.create_record("Objects", None).unwrap();
    let geometry = doc.create_record("Geometry", Some(objects)).unwrap();
    doc[geometry]
        .push(1_000_001i64)
        .push("Geometry::Grid\u{0}\u{1}Geometry")
        .push("Mesh");

    let positions: Vec<f64> = (0..vertices * 3)
        .map(|i| ((i / 3) as f64 * 0.01).sin() * (i % 3 + 1) as f64)
        .collect();
    let v = doc.create_record("Vertices", Some(geometry)).unwrap();
    doc[v].push(positions);

    let indices: Vec<i32> = (0..vertices as i32)
        .map(|i| if i % 3 == 2 { -(i + 1) } else { i })
        .collect();
    let pvi = doc.create_record("PolygonVertexIndex", Some(geometry)).unwrap();
    doc[pvi].push(indices);

    let layer = doc.create_record("LayerElementNormal", Some(geometry)).unwrap();
    doc[layer].push(0i32);
    let mapping = doc.create_record("MappingInformationType", Some(layer)).unwrap();
    doc[mapping].push("ByPolygonVertex");
    let normals = doc.create_record("Normals", Some(layer)).unwrap();
    doc[normals].push(vec![0.0f32, 0.0, 1.0].repeat(vertices));

    let model = doc.create_record("Model", Some(objects)).unwrap();
    doc[model]
        .push(1_000_002i64)
        .push("Model::Grid\u{0}\u{1}Model")
        .push("Mesh");
    let p = doc.create_record("Properties70", Some(model)).unwrap();
    let visibility = doc.create_record("P", Some(p)).unwrap();
    doc[visibility]
        .push("Visibility")
        .push("Visibility")
        .push("")
        .push("A")
        .push(1.0f64);

    let connections = doc.create_record("Connections", None).unwrap();
    let c = doc.create_record("C", Some(connections)).unwrap();
    doc[c].push("OO").push(1_000_001i64).push(1_000_002i64);

    doc
}

// =============================================================================
// REPORT
// =============================================================================

#[derive(Debug, Serialize)]
struct Report {
    source: String,
    version: u32,
    records: usize,
    properties: usize,
    array_elements: usize,
    encoded_bytes: usize,
    zlib_array_bytes: usize,
    raw_array_bytes: usize,
    encode_ms: f64,
    decode_ms: f64,
    encode_mb_per_s: f64,
    decode_mb_per_s: f64,
}

fn best_of<T>(mut f: impl FnMut() -> T) -> (T, Duration) {
    let mut best = Duration::MAX;
    let mut last = None;
    for _ in 0..ITERATIONS {
        let start = Instant::now();
        let out = f();
        best = best.min(start.elapsed());
        last = Some(out);
    }
    (last.expect("at least one iteration"), best)
}

fn throughput(bytes: usize, time: Duration) -> f64 {
    (bytes as f64 / 1_000_000.0) / time.as_secs_f64()
}

fn main() {
    let args = parse_args();

    let (source, doc) = match &args.path {
        Some(path) => {
            let data = load_scene(path);
            let doc = decode_document(&data).expect("Failed to decode scene");
            (path.clone(), doc)
        }
        None => (
            format!("synthetic ({} vertices)", args.vertices),
            synthesize_scene(args.vertices),
        ),
    };

    // Count statistics
    let mut properties = 0;
    let mut array_elements = 0;
    let mut raw_array_bytes = 0;
    let mut zlib_array_bytes = 0;
    for (_, id) in doc.walk() {
        for property in doc[id].properties() {
            properties += 1;
            if property.property_type().is_array() {
                array_elements += property.size();
                let payload = array_payload(property).unwrap_or_default();
                raw_array_bytes += payload.len();
                zlib_array_bytes += deflate(&payload, 6).expect("Failed to compress").len();
            }
        }
    }

    let (encoded, encode_time) = best_of(|| encode_document(&doc).expect("Failed to encode"));
    let (decoded, decode_time) = best_of(|| decode_document(&encoded).expect("Failed to decode"));

    assert_eq!(decoded, doc, "Round trip should preserve the document");
    assert_eq!(
        encode_document(&decoded).expect("Failed to encode"),
        encoded,
        "Re-encoding should be byte-identical"
    );

    let report = Report {
        source,
        version: doc.version(),
        records: doc.len(),
        properties,
        array_elements,
        encoded_bytes: encoded.len(),
        zlib_array_bytes,
        raw_array_bytes,
        encode_ms: encode_time.as_secs_f64() * 1000.0,
        decode_ms: decode_time.as_secs_f64() * 1000.0,
        encode_mb_per_s: throughput(encoded.len(), encode_time),
        decode_mb_per_s: throughput(encoded.len(), decode_time),
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("Failed to serialize report")
        );
        return;
    }

    println!("Scene: {}", report.source);
    println!(
        "  - version {}, {} records, {} properties, {} array elements",
        report.version, report.records, report.properties, report.array_elements
    );
    println!(
        "\nEncode: {} bytes in {:.3} ms",
        report.encoded_bytes, report.encode_ms
    );
    println!("  Throughput: {:.2} MB/s", report.encode_mb_per_s);
    println!("\nDecode: {:.3} ms", report.decode_ms);
    println!("  Throughput: {:.2} MB/s", report.decode_mb_per_s);
    if report.raw_array_bytes > 0 {
        println!(
            "\nArrays: {} bytes raw, {} bytes zlib ({:.1}x)",
            report.raw_array_bytes,
            report.zlib_array_bytes,
            report.raw_array_bytes as f64 / report.zlib_array_bytes as f64
        );
    }
}
