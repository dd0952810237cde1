use media_gateway_recsys::loader::{
    ITEM_HEADER_FILE, ITEM_TRAIN_FILE, ITEM_VECS_FILE, MOVIE_LIST_FILE, USER_HEADER_FILE,
    USER_TO_GENRE_FILE, USER_TRAIN_FILE, Y_TRAIN_FILE,
};
use media_gateway_recsys::RecsysConfig;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ITEMS: &str = "\
1,1995,4.1,1,0,0
2,1995,3.2,0,1,0
3,1996,3.7,0,0,1
4,1996,2.9,1,0,0
";

const MODEL: &str = r#"{
    "user_tower": [
        {"weights": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], "bias": [0.0, 0.0, 0.0], "activation": "relu"}
    ],
    "item_tower": [
        {"weights": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]], "bias": [0.0, 0.0, 0.0], "activation": "linear"}
    ]
}"#;

const SCALERS: &str = r#"{
    "user": {"kind": "identity"},
    "item": {"kind": "identity"},
    "target": {"kind": "min_max", "min": [-1.2222222222222223], "scale": [0.4444444444444444]}
}"#;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// Artifact directory with four movies and two users
///
/// User 7 prefers Drama and rated movies 2 and 4. User 9 has ratings but no
/// training row.
pub fn artifact_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let path = dir.path();

    write(path, ITEM_TRAIN_FILE, ITEMS);
    write(path, ITEM_VECS_FILE, ITEMS);
    write(path, USER_TRAIN_FILE, "7,14,3.8,2.0,4.5,3.0\n7,14,3.8,2.0,4.5,3.0\n");
    write(path, Y_TRAIN_FILE, "4.0\n3.0\n");
    write(path, ITEM_HEADER_FILE, "movie id\nyear\nave rating\nAction\nDrama\nComedy\n");
    write(path, USER_HEADER_FILE, "user id\nrating count\nrating ave\nAction\nDrama\nComedy\n");
    write(
        path,
        MOVIE_LIST_FILE,
        "movieId,title,genres\n\
         1,Heat (1995),Action|Crime\n\
         2,Sense & Sensibility (1995),Drama|Romance\n\
         3,\"Birdcage, The (1996)\",Comedy\n\
         4,Broken Arrow (1996),Action|Thriller\n",
    );
    write(
        path,
        USER_TO_GENRE_FILE,
        r#"{
            "7": {"movies": {"2": 5.0, "4": 2.0}, "rating_ave": 3.8},
            "9": {"movies": {"1": 3.0}}
        }"#,
    );
    write(path, "two_tower.json", MODEL);
    write(path, "scalers.json", SCALERS);

    dir
}

pub fn config_for(dir: &TempDir) -> RecsysConfig {
    let mut config = RecsysConfig::default();
    config.data.dir = dir.path().to_path_buf();
    config.data.model_path = dir.path().join("two_tower.json");
    config.data.scalers_path = Some(dir.path().join("scalers.json"));
    config.prediction.max_rows = 3;
    config
}
