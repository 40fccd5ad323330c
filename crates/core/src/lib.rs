pub mod detection {
    pub mod domain {
        pub mod detector;
        pub mod feature_reading;
    }
    pub mod infrastructure;
}

pub mod gesture {
    pub mod domain {
        pub mod eviction_policy;
        pub mod face_movement_detector;
        pub mod gesture_event;
        pub mod gesture_listener;
        pub mod gesture_thresholds;
        pub mod track_state;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod camera_image;
    pub mod face_gesture_consumer;
    pub mod frame_pipeline;
    pub mod infrastructure;
    pub mod pipeline_logger;
    pub mod resource_monitor;
    pub mod result_consumer;
    pub mod telemetry;
}

pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod settings;
}
