//! Umbrella crate re-exporting every ZenGin toolkit domain.
//!
//! A typical load goes: mount a container with [`vdfs`], open an entry
//! as a [`io::Buffer`], and hand it to the matching parser — a chunked
//! container decoder ([`mesh`], [`anim`]), an archive consumer
//! ([`world`], [`messages`], [`material`]) or the script loader
//! ([`daedalus`]).

pub use ztk_anim as anim;
pub use ztk_archive as archive;
pub use ztk_daedalus as daedalus;
pub use ztk_font as font;
pub use ztk_io as io;
pub use ztk_material as material;
pub use ztk_mesh as mesh;
pub use ztk_messages as messages;
pub use ztk_primitives as primitives;
pub use ztk_tex as tex;
pub use ztk_vdfs as vdfs;
pub use ztk_world as world;
