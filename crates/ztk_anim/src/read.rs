use glam::{Quat, Vec3};

use ztk_io::Buffer;

use crate::{Animation, AnimationError, AnimationEvent, AnimationSample, EventType, Result};

const CHUNK_ANIMATION: u16 = 0xA000;
const CHUNK_SOURCE: u16 = 0xA010;
const CHUNK_HEADER: u16 = 0xA020;
const CHUNK_EVENTS: u16 = 0xA030;
const CHUNK_DATA: u16 = 0xA090;

/// Highest value of a quantized rotation component.
const ROTATION_RANGE: f32 = (1u32 << 16) as f32 - 1.0;
const ROTATION_SCALE: f32 = (1.0 / ROTATION_RANGE) * 2.1;
const ROTATION_MID: u16 = (1 << 15) - 1;

fn read_sample_position(chunk: &mut Buffer, scalar: f32, minimum: f32) -> Result<Vec3> {
    Ok(Vec3::new(
        chunk.get_u16()? as f32 * scalar + minimum,
        chunk.get_u16()? as f32 * scalar + minimum,
        chunk.get_u16()? as f32 * scalar + minimum,
    ))
}

fn read_sample_rotation(chunk: &mut Buffer) -> Result<Quat> {
    let x = (chunk.get_u16()? as f32 - ROTATION_MID as f32) * ROTATION_SCALE;
    let y = (chunk.get_u16()? as f32 - ROTATION_MID as f32) * ROTATION_SCALE;
    let z = (chunk.get_u16()? as f32 - ROTATION_MID as f32) * ROTATION_SCALE;

    let len_q = x * x + y * y + z * z;
    if len_q > 1.0 {
        // numeric drift pushed the vector outside the unit sphere
        let l = 1.0 / len_q.sqrt();
        Ok(Quat::from_xyzw(x * l, y * l, z * l, 0.0))
    } else {
        Ok(Quat::from_xyzw(x, y, z, (1.0 - len_q).sqrt()))
    }
}

impl Animation {
    pub fn parse(buf: &mut Buffer) -> Result<Animation> {
        let mut anim = Animation::default();

        while buf.remaining() > 0 {
            let kind = buf.get_u16()?;
            let length = buf.get_u32()? as usize;
            let mut chunk = buf.extract(length)?;

            match kind {
                CHUNK_HEADER => {
                    let _version = chunk.get_u16()?;
                    anim.name = chunk.get_line(false)?;
                    anim.layer = chunk.get_u32()?;
                    anim.frame_count = chunk.get_u32()?;
                    anim.node_count = chunk.get_u32()?;
                    anim.fps = chunk.get_f32()?;
                    anim.fps_source = chunk.get_f32()?;
                    anim.sample_position_min = chunk.get_f32()?;
                    anim.sample_position_scalar = chunk.get_f32()?;
                    anim.bbox = chunk.get_bbox()?;
                    anim.next = chunk.get_line(false)?;
                }
                CHUNK_EVENTS => {
                    let count = chunk.get_u32()?;
                    anim.events.reserve(count as usize);

                    for _ in 0..count {
                        let raw_type = chunk.get_u32()?;
                        let mut event = AnimationEvent {
                            event_type: EventType::try_from(raw_type)
                                .map_err(|_| AnimationError::UnknownEventType(raw_type))?,
                            no: chunk.get_u32()?,
                            tag: chunk.get_line(true)?,
                            content: Default::default(),
                            values: [0.0; 4],
                            probability: 0.0,
                        };

                        for content in &mut event.content {
                            *content = chunk.get_line(true)?;
                        }
                        for value in &mut event.values {
                            *value = chunk.get_f32()?;
                        }
                        event.probability = chunk.get_f32()?;

                        anim.events.push(event);
                    }
                }
                CHUNK_DATA => {
                    anim.checksum = chunk.get_u32()?;

                    anim.node_indices.clear();
                    anim.node_indices.reserve(anim.node_count as usize);
                    for _ in 0..anim.node_count {
                        anim.node_indices.push(chunk.get_u32()?);
                    }

                    let sample_count = (anim.node_count * anim.frame_count) as usize;
                    anim.samples.clear();
                    anim.samples.reserve(sample_count);

                    for _ in 0..sample_count {
                        let rotation = read_sample_rotation(&mut chunk)?;
                        let position = read_sample_position(
                            &mut chunk,
                            anim.sample_position_scalar,
                            anim.sample_position_min,
                        )?;
                        anim.samples.push(AnimationSample { position, rotation });
                    }
                }
                CHUNK_SOURCE => {
                    // meant to be a date, but the exporter wrote it from an
                    // uninitialized value
                    let _ = chunk.get_date()?;
                    anim.source_path = chunk.get_line(false)?;
                    anim.source_script = chunk.get_line(false)?;
                }
                CHUNK_ANIMATION => {}
                _ => {}
            }

            if chunk.remaining() > 0 {
                log::warn!(
                    "animation({:?}): {} bytes remaining in section 0x{:04X}",
                    anim.name,
                    chunk.remaining(),
                    kind
                );
            }
        }

        Ok(anim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ztk_io::WriteExt;

    fn chunk(out: &mut Vec<u8>, kind: u16, body: &[u8]) {
        out.put_u16(kind).unwrap();
        out.put_u32(body.len() as u32).unwrap();
        out.extend_from_slice(body);
    }

    fn header_chunk(frame_count: u32, node_count: u32) -> Vec<u8> {
        let mut body = Vec::new();
        body.put_u16(0xC8).unwrap();
        body.put_string("S_FISTRUN\n").unwrap();
        body.put_u32(1).unwrap(); // layer
        body.put_u32(frame_count).unwrap();
        body.put_u32(node_count).unwrap();
        body.put_f32(10.0).unwrap(); // fps
        body.put_f32(25.0).unwrap(); // source fps
        body.put_f32(-100.0).unwrap(); // sample position minimum
        body.put_f32(0.01).unwrap(); // sample position scalar
        for _ in 0..6 {
            body.put_f32(0.0).unwrap();
        }
        body.put_string("S_FISTRUN\n").unwrap();
        body
    }

    fn quantize_rotation(q: [f32; 3]) -> [u16; 3] {
        q.map(|c| (c / ((1.0 / (65535.0)) * 2.1) + 32767.0) as u16)
    }

    #[test]
    fn header_and_samples_decode() {
        let (frames, nodes) = (2u32, 3u32);

        let mut data = Vec::new();
        data.put_u32(0xDEADBEEF).unwrap(); // checksum
        for i in 0..nodes {
            data.put_u32(i).unwrap();
        }
        for _ in 0..frames * nodes {
            for component in quantize_rotation([0.5, 0.0, 0.25]) {
                data.put_u16(component).unwrap();
            }
            // position (10000, 20000, 30000) before scaling
            data.put_u16(10000).unwrap();
            data.put_u16(20000).unwrap();
            data.put_u16(30000).unwrap();
        }

        let mut raw = Vec::new();
        chunk(&mut raw, 0xA000, &[]);
        chunk(&mut raw, 0xA020, &header_chunk(frames, nodes));
        chunk(&mut raw, 0xA090, &data);

        let anim = Animation::parse(&mut Buffer::from_vec(raw)).unwrap();
        assert_eq!(anim.name, "S_FISTRUN");
        assert_eq!(anim.fps, 10.0);
        assert_eq!(anim.frame_count, 2);
        assert_eq!(anim.node_count, 3);
        assert_eq!(anim.checksum, 0xDEADBEEF);
        assert_eq!(anim.node_indices, vec![0, 1, 2]);
        assert_eq!(anim.samples.len(), 6);

        let sample = anim.samples[0];
        assert_relative_eq!(sample.position.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(sample.position.y, 100.0, epsilon = 1e-3);
        assert_relative_eq!(sample.position.z, 200.0, epsilon = 1e-3);

        assert_relative_eq!(sample.rotation.x, 0.5, epsilon = 1e-3);
        assert_relative_eq!(sample.rotation.z, 0.25, epsilon = 1e-3);
    }

    #[test]
    fn reconstructed_rotations_are_unit_length() {
        for raw in [[0u16, 0, 0], [65535, 65535, 65535], [40000, 20000, 60000]] {
            let mut bytes = Vec::new();
            for c in raw {
                bytes.put_u16(c).unwrap();
            }

            let q = read_sample_rotation(&mut Buffer::from_vec(bytes)).unwrap();
            assert_relative_eq!(q.length(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn events_decode() {
        let mut body = Vec::new();
        body.put_u32(1).unwrap(); // event count
        body.put_u32(1).unwrap(); // sound event
        body.put_u32(5).unwrap(); // frame ordinal
        body.put_string("DEF_DRAWSOUND\n").unwrap();
        for content in ["WHOOSH.WAV\n", "A\n", "B\n", "C\n"] {
            body.put_string(content).unwrap();
        }
        for v in [0.1f32, 0.2, 0.3, 0.4] {
            body.put_f32(v).unwrap();
        }
        body.put_f32(0.75).unwrap(); // probability

        let mut raw = Vec::new();
        chunk(&mut raw, 0xA030, &body);

        let anim = Animation::parse(&mut Buffer::from_vec(raw)).unwrap();
        assert_eq!(anim.events.len(), 1);

        let event = &anim.events[0];
        assert_eq!(event.event_type, EventType::Sound);
        assert_eq!(event.no, 5);
        assert_eq!(event.tag, "DEF_DRAWSOUND");
        assert_eq!(event.content[0], "WHOOSH.WAV");
        assert_eq!(event.values, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(event.probability, 0.75);
    }
}
